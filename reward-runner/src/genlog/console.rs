//! Console generation logger

use async_trait::async_trait;

use super::{GenerationLogger, GenerationSample};

/// Prints each sample to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleGenerationLogger;

impl ConsoleGenerationLogger {
    /// Text printed for `samples`
    pub fn render(samples: &[GenerationSample]) -> String {
        samples
            .iter()
            .map(|s| {
                format!(
                    "[prompt] {}\n[output] {}\n[ground_truth] {}\n[score] {:?}\n\n",
                    s.prompt, s.output, s.label, s.score
                )
            })
            .collect()
    }
}

#[async_trait]
impl GenerationLogger for ConsoleGenerationLogger {
    fn name(&self) -> &str {
        "console"
    }

    fn log(&self, samples: &[GenerationSample], _step: u64) {
        print!("{}", Self::render(samples));
    }
}
