//! `passgate redact`: Apply a stored policy to a credential subject.

use clap::Args;
use serde_json::json;

use passgate_core::CredentialSubject;
use passgate_disclosure::{ActionKeyResolver, DisclosureFilter};
use passgate_store::PolicyStore;

use crate::commands::read_json_arg;
use crate::config::PassgateConfig;
use crate::setup;

#[derive(Args, Debug)]
pub struct RedactArgs {
    /// Credential subject JSON (as string or path to file).
    #[arg(short, long)]
    pub subject: String,

    /// Policy key. Derived from identity and context data when omitted.
    #[arg(short, long)]
    pub key: Option<String>,

    #[arg(long, default_value = "anonymous-user")]
    pub identity: String,

    #[arg(long, default_value = "")]
    pub context_data: String,
}

pub async fn run(config: &PassgateConfig, args: &RedactArgs) -> anyhow::Result<()> {
    let subject = CredentialSubject::from_value(read_json_arg(&args.subject)?)?;

    let key = match &args.key {
        Some(key) => key.clone(),
        None => setup::build_resolver(&config.keys)?.resolve(&args.identity, &args.context_data),
    };

    let store = setup::open_store(&config.store).await?;
    let record = store.get(&key).await?;

    let filter = DisclosureFilter::new();
    let output = json!({
        "policyKey": key,
        "credentialSubject": filter.redact(&subject, &record),
        "verificationOptions": filter.summarize(&record),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
