use reminder_app::app::{run, AppConfig};

fn main() {
    tracing_subscriber::fmt::init();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err:#}");
            std::process::exit(2);
        }
    };
    match run(config) {
        Ok(report) => match serde_json::to_string_pretty(&report.pending) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Failed to render pending reminders: {err}"),
        },
        Err(err) => {
            eprintln!("Failed to schedule reminders: {err:#}");
            std::process::exit(1);
        }
    }
}
