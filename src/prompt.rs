use crate::errors::StewError;
use anyhow::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use std::io::IsTerminal;

/// Interactive capabilities the install pipeline may ask for.
///
/// Batch mode never reaches a prompter; callers branch on the flag instead.
pub trait Prompter {
    /// Pick one of `options`
    fn select(&self, message: &str, options: &[String]) -> Result<String>;
    /// Yes/no question, defaulting to no
    fn confirm(&self, message: &str) -> Result<bool>;
    /// Free text with a suggested default
    fn input(&self, message: &str, default: &str) -> Result<String>;
    /// Pick any number of `options`, with `selected` checked up front
    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        selected: &[String],
    ) -> Result<Vec<String>>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn ensure_tty(&self) -> Result<()> {
        if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
            Ok(())
        } else {
            Err(StewError::PromptCancelled {
                reason: "not running in a terminal".to_string(),
            }
            .into())
        }
    }
}

fn cancelled(err: dialoguer::Error) -> anyhow::Error {
    StewError::PromptCancelled {
        reason: err.to_string(),
    }
    .into()
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, options: &[String]) -> Result<String> {
        self.ensure_tty()?;
        let selection = Select::new()
            .with_prompt(format!("! {message}"))
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(cancelled)?;

        match selection {
            Some(index) => Ok(options[index].clone()),
            None => Err(StewError::PromptCancelled {
                reason: "no option selected".to_string(),
            }
            .into()),
        }
    }

    fn confirm(&self, message: &str) -> Result<bool> {
        self.ensure_tty()?;
        let answer = Confirm::new()
            .with_prompt(format!("! {message}"))
            .default(false)
            .interact_opt()
            .map_err(cancelled)?;

        answer.ok_or_else(|| {
            StewError::PromptCancelled {
                reason: "no answer given".to_string(),
            }
            .into()
        })
    }

    fn input(&self, message: &str, default: &str) -> Result<String> {
        self.ensure_tty()?;
        Input::<String>::new()
            .with_prompt(message)
            .default(default.to_string())
            .interact_text()
            .map_err(cancelled)
    }

    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        selected: &[String],
    ) -> Result<Vec<String>> {
        self.ensure_tty()?;
        let defaults: Vec<bool> = options.iter().map(|o| selected.contains(o)).collect();
        let picked = MultiSelect::new()
            .with_prompt(message)
            .items(options)
            .defaults(&defaults)
            .interact_opt()
            .map_err(cancelled)?
            .ok_or_else(|| StewError::PromptCancelled {
                reason: "no selection made".to_string(),
            })?;

        Ok(picked.into_iter().map(|i| options[i].clone()).collect())
    }
}
