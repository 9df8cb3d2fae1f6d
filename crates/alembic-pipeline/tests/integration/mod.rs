mod common;

mod background_test;
mod dedup_test;
mod feedback_test;
mod generate_test;
mod history_test;
mod optimize_test;
mod search_test;
