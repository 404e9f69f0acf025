// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use clap::Subcommand;
use revise_core::error::Fallible;

use crate::cmd::add::add;
use crate::cmd::export::export_collection;
use crate::cmd::queue::print_queue;
use crate::cmd::review::review;
use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::start_server;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::sweep::run_sweep;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start tracking a new item.
    Add {
        /// What you are learning.
        title: String,
        /// Schedule the item with the fixed 1-4-7-30-90 day table instead of SM-2.
        #[arg(long)]
        legacy: bool,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Print the items due today, most urgent first.
    Queue {
        /// Maximum number of items to print. By default, all due items are printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Record a review of an item.
    Review {
        /// The item's id, or an unambiguous prefix of it.
        id: String,
        /// How well you recalled it: again, hard, good or easy (or 1-4).
        rating: String,
        /// Seconds spent on the review.
        #[arg(long, default_value_t = 0)]
        time_spent: u32,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Archive and delete completed items whose grace periods have passed.
    Sweep {
        /// Only print what would change.
        #[arg(long)]
        dry_run: bool,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Export all items as JSON.
    Export {
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Serve the collection over a JSON HTTP API.
    Serve {
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    match cli.command {
        Command::Add {
            title,
            legacy,
            directory,
        } => add(directory, title, legacy),
        Command::Queue { limit, directory } => print_queue(directory, limit),
        Command::Review {
            id,
            rating,
            time_spent,
            directory,
        } => review(directory, id, rating, time_spent),
        Command::Sweep { dry_run, directory } => run_sweep(directory, dry_run),
        Command::Stats { format, directory } => print_stats(directory, format),
        Command::Export { output, directory } => export_collection(directory, output),
        Command::Serve {
            host,
            port,
            directory,
        } => {
            let config = ServerConfig {
                directory,
                host,
                port,
            };
            start_server(config).await
        }
    }
}
