use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wikicorpus::blocking::WikiClient;
use wikicorpus::{
    get_headings, heading_frequencies, overwrite_redirects, LinkDirection, Namespace,
};

#[derive(Parser, Debug)]
#[command(
    name = "corpus-cli",
    about = "Harvest Wikipedia article text, categories, links, and redirects"
)]
struct Cli {
    /// Wikipedia language edition to query
    #[arg(long, default_value = "en")]
    lang: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the plaintext of one or more articles
    Articles {
        /// Article titles
        titles: Vec<String>,
        /// Print full text instead of a summary line per article
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// List the members of a category
    Members {
        /// Category name, with or without the Category: prefix
        category: String,
        /// List pages instead of subcategories
        #[arg(long, default_value_t = false)]
        pages: bool,
    },
    /// List links of a page
    Links {
        /// Page title
        page: String,
        /// List incoming links instead of outgoing ones
        #[arg(long, default_value_t = false)]
        incoming: bool,
    },
    /// Resolve redirects for titles and print the rewritten title list
    Resolve {
        /// Page titles to resolve
        titles: Vec<String>,
    },
    /// Tally level-2 headings across a set of articles
    Headings {
        /// Article titles
        titles: Vec<String>,
        /// Number of headings to show
        #[arg(long, default_value_t = 25)]
        top: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikicorpus=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = WikiClient::new(&cli.lang).context("failed to build client")?;

    match cli.command {
        Command::Articles { titles, full } => {
            let batch = client.articles(&titles)?;
            for article in &batch.articles {
                if full {
                    println!("# {}\n\n{}\n", article.title, article.text);
                } else {
                    println!(
                        "{}\t{} chars{}",
                        article.title,
                        article.text.len(),
                        if article.possibly_truncated {
                            " (possibly truncated)"
                        } else {
                            ""
                        }
                    );
                }
            }
            for title in &batch.missing {
                eprintln!("missing: {title}");
            }
        }
        Command::Members { category, pages } => {
            let namespace = if pages {
                Namespace::Main
            } else {
                Namespace::Category
            };
            for member in client.category_members(&category, namespace)? {
                println!("{}", member.title);
            }
        }
        Command::Links { page, incoming } => {
            let direction = if incoming {
                LinkDirection::Incoming
            } else {
                LinkDirection::Outgoing
            };
            for link in client.links(&page, direction, &[0])? {
                println!("{}", link.title);
            }
        }
        Command::Resolve { titles } => {
            let resolved = client.resolve_redirects(&titles)?;
            let map = resolved
                .iter()
                .filter_map(|(from, to)| {
                    to.as_ref().map(|to| (from.clone(), to.clone()))
                })
                .collect();
            for title in overwrite_redirects(&titles, &map) {
                println!("{title}");
            }
        }
        Command::Headings { titles, top } => {
            let batch = client.articles(&titles)?;
            let headings = batch
                .articles
                .iter()
                .flat_map(|article| get_headings(&article.text));
            for row in heading_frequencies(headings).into_iter().take(top) {
                println!("{}\t{}", row.count, row.heading);
            }
        }
    }

    Ok(())
}
