use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `ordo completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the completion script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    generate(shell, command, "ordo", &mut out);
    Ok(())
}
