//! `passgate verify`: Run a verification request against the mock verifier.

use clap::Args;
use std::sync::Arc;

use passgate_core::CredentialSubject;
use passgate_verifier::{MockProofVerifier, VerifyRequest};

use crate::commands::read_json_arg;
use crate::config::PassgateConfig;
use crate::setup;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Request JSON (as string or path to file).
    #[arg(short, long)]
    pub request: String,

    /// Subject the mock verifier discloses (as string or path to file).
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Make the mock verifier reject the proof.
    #[arg(long)]
    pub reject: bool,
}

pub async fn run(config: &PassgateConfig, args: &VerifyArgs) -> anyhow::Result<()> {
    let request: VerifyRequest = serde_json::from_value(read_json_arg(&args.request)?)
        .map_err(|e| anyhow::anyhow!("invalid request: {}", e))?;

    let verifier = if args.reject {
        MockProofVerifier::rejecting()
    } else {
        match &args.subject {
            Some(subject) => {
                MockProofVerifier::accepting(CredentialSubject::from_value(read_json_arg(subject)?)?)
            }
            None => MockProofVerifier::default(),
        }
    };

    let orchestrator = setup::build_orchestrator(config, Arc::new(verifier)).await?;
    let response = orchestrator.handle(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("verification failed (status {})", response.status_code);
    }
    Ok(())
}
