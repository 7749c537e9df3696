mod formatter;
mod test_case;

pub use formatter::{write_output, JsonOutput, OutputFormatter};
pub use test_case::{TestCaseRecord, TestTrait};
