//! Interactive human input for steering a discussion.
//!
//! When the planned rounds are used up, the user sees:
//!
//! ```text
//! ════════════════════════════════════════════════════════════
//!   Planned rounds complete (3 so far)
//! ════════════════════════════════════════════════════════════
//!
//! Participants: gpt-4o, deepseek-chat, qwen-max
//! History size: ~4210 tokens
//!
//! Start new rounds? [y/N]
//! How many extra rounds?
//! Any guidance for the participants? (Enter to skip)
//! ```
//!
//! The same prompter also picks the topic, the round count and the
//! participants at startup when they are not configured.

use async_trait::async_trait;
use colored::Colorize;
use roundtable_application::{HumanInputError, HumanInputPort};
use roundtable_domain::{DecisionQuery, HumanDecision, Model, Topic};
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

type Reader = Box<dyn BufRead + Send>;
type Writer = Box<dyn Write + Send>;

/// Terminal prompter implementing [`HumanInputPort`].
pub struct InteractiveHumanInput {
    reader: Mutex<Reader>,
    writer: Mutex<Writer>,
}

impl InteractiveHumanInput {
    /// Prompter on stdin/stdout
    pub fn new() -> Self {
        Self::with_io(
            Box::new(io::BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    pub fn with_io(reader: Reader, writer: Writer) -> Self {
        Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }

    fn say(&self, text: &str) -> Result<(), HumanInputError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| HumanInputError::IoError("output lock poisoned".to_string()))?;
        writeln!(writer, "{}", text)
            .map_err(|e| HumanInputError::IoError(format!("Failed to write output: {}", e)))
    }

    /// Show `prompt` and read one trimmed line. End of input is a cancellation.
    fn ask(&self, prompt: &str) -> Result<String, HumanInputError> {
        {
            let mut writer = self
                .writer
                .lock()
                .map_err(|_| HumanInputError::IoError("output lock poisoned".to_string()))?;
            write!(writer, "{} ", prompt.bold())
                .and_then(|_| writer.flush())
                .map_err(|e| HumanInputError::IoError(format!("Failed to flush stdout: {}", e)))?;
        }

        let mut input = String::new();
        let read = self
            .reader
            .lock()
            .map_err(|_| HumanInputError::IoError("input lock poisoned".to_string()))?
            .read_line(&mut input)
            .map_err(|e| HumanInputError::IoError(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            return Err(HumanInputError::Cancelled);
        }
        Ok(input.trim().to_string())
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, HumanInputError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{} {}", prompt, hint))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say(&"Please answer y or n.".yellow().to_string())?,
            }
        }
    }

    fn ask_positive(&self, prompt: &str) -> Result<u32, HumanInputError> {
        loop {
            let answer = self.ask(prompt)?;
            match answer.parse::<u32>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => self.say(&"Please enter a whole number of at least 1.".yellow().to_string())?,
            }
        }
    }

    /// Ask for the discussion topic until a non-blank one is given
    pub fn prompt_topic(&self) -> Result<Topic, HumanInputError> {
        loop {
            if let Some(topic) = Topic::try_new(self.ask("Discussion topic:")?) {
                return Ok(topic);
            }
        }
    }

    /// Ask how many rounds to plan before the first decision
    pub fn prompt_rounds(&self) -> Result<u32, HumanInputError> {
        self.ask_positive("Number of rounds:")
    }

    /// Let the user pick participants from a numbered list
    pub fn select_models(&self, available: &[Model]) -> Result<Vec<Model>, HumanInputError> {
        if available.is_empty() {
            return Err(HumanInputError::InvalidInput(
                "the backend offers no models to choose from".to_string(),
            ));
        }
        loop {
            let answer = self.ask("Select models (e.g. 1,3,5 or 2-4 or all):")?;
            match parse_selection(&answer, available.len()) {
                Ok(indices) => {
                    let chosen: Vec<Model> =
                        indices.into_iter().map(|i| available[i].clone()).collect();
                    let names: Vec<&str> = chosen.iter().map(Model::as_str).collect();
                    self.say(&format!("  Selected: {}", names.join(", ").green().bold()))?;
                    return Ok(chosen);
                }
                Err(msg) => self.say(&msg.red().to_string())?,
            }
        }
    }
}

impl Default for InteractiveHumanInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanInputPort for InteractiveHumanInput {
    async fn request_decision(
        &self,
        query: &DecisionQuery,
    ) -> Result<HumanDecision, HumanInputError> {
        let rule = "═".repeat(60);
        self.say("")?;
        self.say(&rule.yellow().bold().to_string())?;
        self.say(
            &format!("  Planned rounds complete ({} so far)", query.completed_rounds)
                .yellow()
                .bold()
                .to_string(),
        )?;
        self.say(&rule.yellow().bold().to_string())?;
        self.say("")?;
        self.say(&format!(
            "{} {}",
            "Participants:".cyan().bold(),
            query.participants.join(", ")
        ))?;
        self.say(&format!(
            "{} ~{} tokens",
            "History size:".cyan().bold(),
            query.history_tokens
        ))?;
        self.say("")?;

        if !self.confirm("Start new rounds?", false)? {
            return Ok(HumanDecision::Finish);
        }
        let extra = self.ask_positive("How many extra rounds?")?;
        let guidance = self.ask("Any guidance for the participants? (Enter to skip)")?;
        Ok(HumanDecision::continue_with(extra, Some(guidance)))
    }
}

/// Parse a 1-based selection like `1,3`, `2-4`, `1 2` or `all` into
/// distinct 0-based indices, in the order given.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..count).collect());
    }

    let parse_index = |s: &str| -> Result<usize, String> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid input: '{}'", s.trim()))?;
        if n == 0 || n > count {
            return Err(format!("Index {} out of range (1-{})", n, count));
        }
        Ok(n - 1)
    };

    let mut indices = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let range = match token.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_index(start)?, parse_index(end)?);
                if start > end {
                    return Err(format!("Invalid range: '{}'", token));
                }
                start..=end
            }
            None => {
                let i = parse_index(token)?;
                i..=i
            }
        };
        for i in range {
            if !indices.contains(&i) {
                indices.push(i);
            }
        }
    }

    if indices.is_empty() {
        return Err("Select at least one model".to_string());
    }
    Ok(indices)
}
