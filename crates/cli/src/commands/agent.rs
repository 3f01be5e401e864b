//! `turnwise agent`: interactive or single-message chat mode.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use turnwise_agent::{Agent, Preset, Reply, StopReason};
use turnwise_config::AppConfig;
use turnwise_core::agent::AgentConfigUpdate;
use turnwise_core::tool::Progress;

pub async fn run(
    preset: &str,
    message: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early and give a clear error
    if !config.has_api_key() && !turnwise_providers::is_local_provider(&config.provider.name) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    TURNWISE_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let preset: Preset = preset.parse()?;
    let provider = turnwise_providers::build_from_config(&config)?;
    let overrides = config.agent_overrides().and(&AgentConfigUpdate {
        model,
        ..Default::default()
    });
    let mut agent = preset.build(provider, &overrides)?;
    tracing::debug!(preset = %preset, model = %agent.config().model, "Agent ready");

    let report = |msg: &str| eprintln!("  [tool] {msg}");
    let progress = Progress::new(&report);

    if let Some(msg) = message {
        // Single message mode
        let reply = agent.generate_response(Some(&msg), progress).await?;
        println!("{}", reply.text());
        print_stop_notice(&reply);
        return Ok(());
    }

    print_banner(&agent, &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            prompt()?;
            continue;
        }

        match agent.generate_response(Some(input), progress).await {
            Ok(reply) => {
                println!();
                for line in reply.text().lines() {
                    println!("  Assistant > {line}");
                }
                print_stop_notice(&reply);
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_banner(agent: &Agent, config: &AppConfig) {
    println!();
    println!("  Turnwise: {}", agent.name());
    println!();
    let base_url = turnwise_providers::resolve_base_url(config).unwrap_or("unset");
    println!("  Provider:  {} ({})", config.provider.name, base_url);
    println!("  Model:     {}", agent.config().model);
    println!("  Tools:     {}", agent.tool_names().join(", "));
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();
}

fn print_stop_notice(reply: &Reply) {
    if reply.stop == StopReason::ContinuationLimit {
        eprintln!(
            "  [notice] assistant kept going for {} turns; handing the floor back to you",
            reply.continuations
        );
    }
}
