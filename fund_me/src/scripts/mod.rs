//! Deploy scripts, run in id order and selected by tags.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{deployer::DeployEnvironment, error::DeployError};

pub mod deploy_fund_me;
pub mod deploy_mocks;

pub use deploy_fund_me::DeployFundMe;
pub use deploy_mocks::DeployMocks;

#[async_trait]
pub trait DeployScript: Send + Sync {
    /// unique id, scripts run in ascending id order
    fn id(&self) -> &'static str;

    fn tags(&self) -> &'static [&'static str];

    /// tags of the scripts that must run before this one
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    async fn run(&self, env: &mut DeployEnvironment) -> Result<(), DeployError>;
}

pub fn all_scripts() -> Vec<Box<dyn DeployScript>> {
    let mut scripts: Vec<Box<dyn DeployScript>> =
        vec![Box::new(DeployMocks), Box::new(DeployFundMe)];
    scripts.sort_by_key(|script| script.id());
    scripts
}

/// Scripts to run for `tags`: every script when no tag is given, otherwise the
/// tagged ones plus (transitively) the scripts providing their dependencies.
pub fn select<'a>(
    scripts: &'a [Box<dyn DeployScript>],
    tags: &[&str],
) -> Vec<&'a dyn DeployScript> {
    if tags.is_empty() {
        return scripts.iter().map(|s| &**s).collect();
    }

    let mut wanted: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let mut selected = vec![false; scripts.len()];
    loop {
        let mut changed = false;
        for (i, script) in scripts.iter().enumerate() {
            if selected[i] || !script.tags().iter().any(|t| wanted.iter().any(|w| w == t)) {
                continue;
            }
            selected[i] = true;
            changed = true;
            wanted.extend(script.dependencies().iter().map(|d| d.to_string()));
        }
        if !changed {
            break;
        }
    }

    scripts
        .iter()
        .zip(selected)
        .filter_map(|(script, keep)| keep.then_some(&**script))
        .collect()
}

/// Requested tags no script carries.
pub fn unknown_tags<'t>(scripts: &[Box<dyn DeployScript>], tags: &[&'t str]) -> Vec<&'t str> {
    tags.iter()
        .copied()
        .filter(|tag| !scripts.iter().any(|script| script.tags().iter().any(|t| t == tag)))
        .collect()
}

pub async fn run(env: &mut DeployEnvironment, tags: &[&str]) -> Result<(), DeployError> {
    let scripts = all_scripts();
    for tag in unknown_tags(&scripts, tags) {
        warn!("no deploy script has tag '{tag}'");
    }
    let selected = select(&scripts, tags);

    if selected.is_empty() {
        warn!("no deploy script matches tags {tags:?}");
        return Ok(());
    }

    for script in selected {
        debug!("running deploy script {}", script.id());
        script.run(env).await?;
    }
    Ok(())
}
