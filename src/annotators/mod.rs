pub mod add_lines;
pub mod line_marking;
pub mod remove_lines;

pub use add_lines::{AddLines, AddLinesConfig};
pub use remove_lines::{RemoveLines, RemoveLinesConfig};

use crate::annotator::Annotator;
use crate::config::Config;

/// All annotators, configured. Order is the processing order.
pub fn all_annotators(config: &Config) -> Vec<Box<dyn Annotator>> {
    vec![AddLines::from_config(config), RemoveLines::from_config(config)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_annotators_default_config() {
        let annotators = all_annotators(&Config::default());
        assert_eq!(annotators.len(), 2);
        assert_eq!(annotators[0].name(), "add-lines");
        assert_eq!(annotators[1].name(), "remove-lines");
        assert_eq!(annotators[0].attribute(), "add-lines");
        assert_eq!(annotators[1].attribute(), "remove-lines");
        assert_eq!(annotators[0].marker_class(), "add");
        assert_eq!(annotators[1].marker_class(), "remove");
    }
}
