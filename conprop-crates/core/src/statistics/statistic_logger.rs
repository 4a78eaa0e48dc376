use std::fmt::Display;

use super::statistic_logging::log_statistic;

/// Writes statistics under a name prefix, such as the name and id of the state they belong to.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new(name_prefix: impl Display) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
        }
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        if self.name_prefix.is_empty() {
            return StatisticLogger::new(addition_to_prefix);
        }

        Self {
            name_prefix: format!("{}_{}", self.name_prefix, addition_to_prefix),
        }
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }
}

impl std::fmt::Write for StatisticLogger {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        log_statistic(&self.name_prefix, s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_joined_with_underscores() {
        let logger = StatisticLogger::new("sum")
            .attach_to_prefix(3)
            .attach_to_prefix("num_conflicts");

        assert_eq!("sum_3_num_conflicts", logger.name_prefix());
    }

    #[test]
    fn empty_prefix_is_not_followed_by_an_underscore() {
        let logger = StatisticLogger::default().attach_to_prefix("num_propagation_calls");

        assert_eq!("num_propagation_calls", logger.name_prefix());
    }
}
