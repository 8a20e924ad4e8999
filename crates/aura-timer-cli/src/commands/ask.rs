use aura_timer_core::{Config, DurationAnswer, DurationParser, HttpDurationParser};
use serde_json::json;

pub fn run(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let parser = HttpDurationParser::from_config(&config.duration_service)?;

    let answer = super::runtime()?.block_on(parser.parse_duration(text))?;
    match answer {
        DurationAnswer::Seconds(seconds) => {
            println!("{}", json!({ "seconds": seconds }));
            Ok(())
        }
        DurationAnswer::NotUnderstood => Err(format!("could not interpret: {text}").into()),
    }
}
