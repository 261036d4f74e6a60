//! `passgate resolve-key`: Print the action key a request would use.

use clap::Args;

use passgate_disclosure::ActionKeyResolver;

use crate::config::PassgateConfig;
use crate::setup;

#[derive(Args, Debug)]
pub struct ResolveKeyArgs {
    /// Caller identity.
    #[arg(short, long, default_value = "anonymous-user")]
    pub identity: String,

    /// Caller context data.
    pub context_data: String,
}

pub fn run(config: &PassgateConfig, args: &ResolveKeyArgs) -> anyhow::Result<()> {
    let resolver = setup::build_resolver(&config.keys)?;
    println!("{}", resolver.resolve(&args.identity, &args.context_data));
    Ok(())
}
