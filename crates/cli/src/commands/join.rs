//! Terminal rendition of the waitlist page.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use cove_core::config::{AppConfig, LoadOptions};
use cove_core::flows::FlowAction;
use cove_core::{ConfirmPolicy, Field, FlowState, Submitter, WaitlistSession};
use tracing::warn;

use crate::client::SubmissionClient;
use crate::commands::CommandResult;

/// Order in which the form asks for its fields.
pub const FORM_ORDER: [Field; 4] = [Field::FullName, Field::Age, Field::PhoneNumber, Field::City];

pub async fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("join", "config_validation", error.to_string(), 2)
        }
    };

    let client = SubmissionClient::new(config.client.endpoint_url.clone());
    let policy = ConfirmPolicy::from_confirm_on_failure(config.client.confirm_on_failure);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match run_session(&mut input, &mut output, &client, policy).await {
        Ok(FlowState::Confirmed) => CommandResult::success("join", "waitlist entry confirmed"),
        Ok(state) => CommandResult::success("join", format!("session ended in {state:?}")),
        Err(error) => CommandResult::failure("join", "session", error.to_string(), 1),
    }
}

/// Drives one waitlist session over line-oriented input and output.
pub async fn run_session<R, W, S>(
    input: &mut R,
    output: &mut W,
    submitter: &S,
    policy: ConfirmPolicy,
) -> Result<FlowState>
where
    R: BufRead,
    W: Write,
    S: Submitter + ?Sized,
{
    let mut session = WaitlistSession::new(policy);

    writeln!(output, "cove")?;
    writeln!(output, "plug back into community.")?;
    write!(output, "join the waitlist? [y/N] ")?;
    output.flush()?;
    let answer = read_line(input)?;
    if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        writeln!(output, "maybe next time.")?;
        return Ok(session.state().clone());
    }
    session.join()?;

    let mut pending: Vec<Field> = FORM_ORDER.to_vec();
    loop {
        for field in &pending {
            write!(output, "{}: ", field.label())?;
            output.flush()?;
            let typed = read_line(input)?;
            session.edit(*field, "")?;
            let stored = session.type_keys(*field, &typed)?;
            if stored != typed {
                writeln!(output, "  stored as `{stored}`")?;
            }
        }

        // Answers are not echoed when input is piped; keep outcomes on their own line.
        writeln!(output)?;
        let transition = session.submit(submitter).await?;
        match transition.to {
            FlowState::Confirmed => {
                if let Some(reason) = session.last_outcome().and_then(|o| o.failure_reason()) {
                    warn!(
                        event_name = "client.session.confirmed_after_failure",
                        reason, "submission failed but the session was confirmed"
                    );
                }
                writeln!(output, "you're on the list. we'll be in touch.")?;
                return Ok(FlowState::Confirmed);
            }
            FlowState::Editing if transition.actions.contains(&FlowAction::MarkFieldErrors) => {
                pending = session.errors().failed_fields();
                let names: Vec<&str> = pending.iter().map(|field| field.label()).collect();
                writeln!(output, "please check: {}", names.join(", "))?;
            }
            FlowState::Editing => {
                let reason = session
                    .last_outcome()
                    .and_then(|o| o.failure_reason())
                    .unwrap_or("unknown error")
                    .to_string();
                writeln!(output, "submission failed: {reason}")?;
                write!(output, "try again? [Y/n] ")?;
                output.flush()?;
                let retry = read_line(input)?;
                if matches!(retry.trim().to_ascii_lowercase().as_str(), "n" | "no") {
                    return Ok(FlowState::Editing);
                }
                pending = Vec::new();
            }
            other => bail!("unexpected session state {other:?} after submitting"),
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before the form was complete");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
