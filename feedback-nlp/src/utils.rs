use {
    tracing::Level,
    tracing_subscriber::{
        prelude::*,
        filter::filter_fn,
    },
};

pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let trace_topics = level == Level::TRACE;

    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish()
        .with(filter_fn(move |metadata| {
            // per-document inference output is only useful when tracing
            if metadata.target().starts_with("feedback_nlp::topics") {
                trace_topics || metadata.level() < &Level::DEBUG
            } else {
                true
            }
        }))
        .init();
}
