//! `passgate policy`: Read and write stored policies.

use clap::{Args, Subcommand};

use passgate_store::{PolicyDocument, PolicyStore};

use crate::commands::read_json_arg;
use crate::config::{PassgateConfig, StoreBackend};
use crate::setup;

#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub action: PolicyAction,
}

#[derive(Subcommand, Debug)]
pub enum PolicyAction {
    /// Store a policy under a key.
    Set {
        /// Action key or user id.
        key: String,
        /// Policy options JSON (as string or path to file).
        #[arg(short, long)]
        options: String,
    },
    /// Print the policy in effect for a key.
    Get {
        /// Action key or user id.
        key: String,
    },
}

pub async fn run(config: &PassgateConfig, args: &PolicyArgs) -> anyhow::Result<()> {
    let store = setup::open_store(&config.store).await?;

    match &args.action {
        PolicyAction::Set { key, options } => {
            if config.store.backend == StoreBackend::Memory {
                tracing::warn!("memory backend selected, the policy is lost when this command exits");
            }
            let record = PolicyDocument::from_value(read_json_arg(options)?)?;
            let created = store.set(key, record).await?;
            println!("{} policy '{}'", if created { "Created" } else { "Updated" }, key);
        }
        PolicyAction::Get { key } => {
            let record = store.get(key).await?;
            let doc = PolicyDocument::from(&record);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}
