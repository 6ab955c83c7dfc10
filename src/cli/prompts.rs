//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

use crate::pipeline::{FeaturePrompter, NumericDomain};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Terminal implementation of the prediction form
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl FeaturePrompter for DialoguerPrompter {
    fn skip(&mut self, feature: &str) -> Result<bool> {
        let skip = Confirm::new()
            .with_prompt(format!("Skip {} value?", feature))
            .default(false)
            .interact()?;
        Ok(skip)
    }

    fn choose(&mut self, feature: &str, options: &[String]) -> Result<String> {
        if options.is_empty() {
            anyhow::bail!("No values observed for '{}'", feature);
        }
        let index = Select::new()
            .with_prompt(format!("Select {}", feature))
            .items(options)
            .default(0)
            .interact()?;
        Ok(options[index].clone())
    }

    fn number(&mut self, feature: &str, domain: &NumericDomain) -> Result<f64> {
        let domain = *domain;
        let value = Input::<f64>::new()
            .with_prompt(format!(
                "{} [{:.2} – {:.2}]",
                feature, domain.min, domain.max
            ))
            .default(domain.default_input())
            .validate_with(move |v: &f64| -> Result<(), String> {
                if domain.contains(*v) {
                    Ok(())
                } else {
                    Err(format!(
                        "Value must be between {:.2} and {:.2}",
                        domain.min, domain.max
                    ))
                }
            })
            .interact_text()?;
        Ok(value)
    }
}
