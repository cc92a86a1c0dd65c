pub const DEFAULT_MAX_PARALLEL_STEPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on extraction steps running at once; zero is treated as one
    pub max_parallel_steps: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_steps: DEFAULT_MAX_PARALLEL_STEPS,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_parallel_steps(mut self, max_parallel_steps: usize) -> Self {
        self.max_parallel_steps = max_parallel_steps;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_parallel_steps, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new().with_max_parallel_steps(1);
        assert_eq!(config.max_parallel_steps, 1);
    }
}
