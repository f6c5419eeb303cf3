//! Checks a relayer configuration file without starting anything.
//!
//! Exits zero when the file parses and passes validation; otherwise the
//! failure goes to stderr and the exit code is non-zero, so this slots
//! straight into CI and deploy scripts.

use relayer_config::ConfigLoader;
use std::process::ExitCode;

fn main() -> ExitCode {
	let Some(path) = std::env::args().nth(1) else {
		eprintln!("usage: validate-config <config.toml|config.json>");
		return ExitCode::FAILURE;
	};

	match ConfigLoader::from_file(&path) {
		Ok(config) => {
			let spokes: Vec<String> = config
				.enabled_chains
				.iter()
				.map(|chain| chain.to_string())
				.collect();
			println!("{path}: ok");
			println!(
				"  relayer {} on hub chain {}, spokes [{}]",
				config.relayer_address,
				config.hub_chain,
				spokes.join(", ")
			);
			if config.inventory.is_inventory_management_enabled() {
				println!(
					"  inventory management on ({} managed token{})",
					config.inventory.tokens.len(),
					if config.inventory.tokens.len() == 1 { "" } else { "s" }
				);
			} else {
				println!("  inventory management off");
			}
			println!("  refresh every {}s", config.update_interval_secs);
			ExitCode::SUCCESS
		}
		Err(e) => {
			eprintln!("{path}: {e:#}");
			ExitCode::FAILURE
		}
	}
}
