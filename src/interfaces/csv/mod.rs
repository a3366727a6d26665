pub mod card_reader;
pub mod outcome_writer;
pub mod sale_reader;

/// Shared reader settings: trimmed fields, tolerant of short rows.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(true);
    builder
}
