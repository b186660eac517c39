//! `crestx` — command-line CREST explorer.
//!
//! Subcommands:
//!
//! - **`browse`** — fetch an address, render it, optionally keep refreshing.
//! - **`render`** — render a JSON document from disk or stdin, offline.
//! - **`schema`** — save the schema fragment of an address's representation.
//! - **`authorize`** — print an OAuth implicit-grant URL and its CSRF state.
//! - **`callback`** — check a redirect hash against that state, print the token.
//!
//! Configuration comes from `CREST_*` environment variables (see
//! [`ExplorerConfig`]); flags override them.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use crestexplorer::media::schema_document;
use crestexplorer::{build_element, present, Address, AuthorizationRequest, DisplayNode, OAuthCallback};
use crestexplorer_client::{refresh, Explorer, ExplorerConfig, Page};

/// crestx — CREST explorer CLI
///
/// Browse hypermedia JSON APIs whose resources link to each other with
/// `{ "href": …, "name": … }` objects and describe themselves via OPTIONS.
#[derive(Parser)]
#[command(name = "crestx", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented outline; links show their href.
    Text,
    /// The data pane as an HTML fragment.
    Html,
    /// The display tree (and page metadata, for `browse`) as JSON.
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch an address and render it.
    ///
    /// ADDRESS is an absolute URI, optionally followed by `#<media-type>`;
    /// a leading `#` is accepted so fragments can be pasted directly.
    ///
    /// Examples:
    ///   crestx browse https://crest-tq.eveonline.com/
    ///   crestx browse '#https://crest-tq.eveonline.com/#application/vnd.ccp.eve.Api-v3+json'
    Browse {
        address: String,

        /// Request this representation instead of the server default.
        #[arg(long, value_name = "MEDIA_TYPE")]
        accept: Option<String>,

        /// Bearer token (overrides CREST_TOKEN).
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,

        #[arg(long, value_enum, env = "CRESTX_FORMAT", default_value_t = Format::Text)]
        format: Format,

        /// Re-render every SECS seconds until interrupted (overrides
        /// CREST_REFRESH_SECS; 0 disables).
        #[arg(long, value_name = "SECS")]
        refresh: Option<u64>,
    },

    /// Render a JSON document without touching the network.
    ///
    /// Pass `-` as FILE to read from stdin.
    Render {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,

        /// JSON-Schema fragment describing the document.
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,

        #[arg(long, value_enum, env = "CRESTX_FORMAT", default_value_t = Format::Text)]
        format: Format,
    },

    /// Save the schema of an address's representation as `<name>.json`.
    Schema {
        address: String,

        /// Directory to write into.
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,

        /// Bearer token (overrides CREST_TOKEN).
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
    },

    /// Print the OAuth authorization URL and the CSRF state to keep.
    Authorize {
        /// Space-separated scopes (overrides CREST_SCOPES).
        #[arg(long, value_name = "SCOPES")]
        scopes: Option<String>,
    },

    /// Verify an OAuth redirect hash and print its access token.
    ///
    /// Example:
    ///   crestx callback '#access_token=abc&token_type=Bearer&state=5f0c…' --state 5f0c…
    Callback {
        /// The fragment of the redirect URL.
        hash: String,

        /// The state printed by `crestx authorize`.
        #[arg(long, value_name = "STATE")]
        state: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crestx=info,crestexplorer_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ExplorerConfig::from_env();

    match cli.command {
        Command::Browse {
            address,
            accept,
            token,
            format,
            refresh,
        } => {
            if token.is_some() {
                config.token = token;
            }
            if let Some(secs) = refresh {
                config.refresh_interval = (secs > 0).then(|| Duration::from_secs(secs));
            }
            let fragment = with_accept(&address, accept);
            let explorer = Arc::new(connect(&config));

            match explorer.navigate(&fragment).await {
                Ok(Some(page)) => print_page(&page, format),
                Ok(None) => {}
                Err(e) => {
                    eprintln!("crestx: {e}");
                    process::exit(1);
                }
            }

            if let Some(period) = config.refresh_interval {
                tracing::info!("crestx: refreshing every {}s, ctrl-c to stop", period.as_secs());
                refresh::run(explorer, period, |page| {
                    print_page(page, format);
                    true
                })
                .await;
            }
        }

        Command::Render {
            file,
            schema,
            format,
        } => {
            let value = parse_json(&read_input(&file), &file);
            let schema = schema.map(|path| parse_json(&read_input(&path), &path));
            let tree = build_element(&value, schema.as_ref());
            print_tree(&tree, format);
        }

        Command::Schema {
            address,
            out,
            token,
        } => {
            if token.is_some() {
                config.token = token;
            }
            let explorer = connect(&config);
            let page = match explorer.navigate(&address).await {
                Ok(Some(page)) => page,
                Ok(None) => fatal("navigation was superseded"),
                Err(e) => fatal(&e.to_string()),
            };
            let Some(fragment) = &page.schema else {
                fatal(&format!("no schema describes {}", page.media_type));
            };
            let path = out.join(page.schema_file_name());
            fs::write(&path, schema_document(fragment))
                .unwrap_or_else(|e| fatal(&format!("failed to write {}: {}", path.display(), e)));
            println!("{}", path.display());
        }

        Command::Authorize { scopes } => {
            if let Some(scopes) = scopes {
                config.scopes = scopes;
            }
            let request = AuthorizationRequest::new(
                config.authorize_url,
                config.client_id,
                config.redirect_uri,
                config.scopes,
            );
            let url = request.url().unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{url}");
            println!("state: {}", request.state);
        }

        Command::Callback { hash, state } => {
            let callback = OAuthCallback::from_hash(&hash)
                .unwrap_or_else(|| fatal("redirect hash carries no access_token"));
            let token = callback
                .verify(Some(&state))
                .unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{token}");
        }
    }
}

/// Fold `--accept` into the address as a media-type override.
fn with_accept(address: &str, accept: Option<String>) -> String {
    match accept {
        None => address.to_string(),
        Some(media_type) => {
            let parsed = Address::parse(address).unwrap_or_else(|e| fatal(&e.to_string()));
            Address::with_media_type(parsed.uri, media_type).to_fragment()
        }
    }
}

fn connect(config: &ExplorerConfig) -> Explorer {
    Explorer::from_config(config).unwrap_or_else(|e| fatal(&e.to_string()))
}

fn print_page(page: &Page, format: Format) {
    match format {
        Format::Json => println!("{}", to_json(page)),
        Format::Html => print!("{}", present::to_html(&page.tree)),
        Format::Text => {
            println!("{}  [{}]", page.address.uri, page.media_type);
            for alt in page.representations.iter().filter(|r| !r.selected) {
                println!("  also: {}  {}", alt.name, alt.fragment);
            }
            println!();
            print!("{}", present::to_text(&page.tree));
        }
    }
}

fn print_tree(tree: &DisplayNode, format: Format) {
    match format {
        Format::Json => println!("{}", to_json(tree)),
        Format::Html => print!("{}", present::to_html(tree)),
        Format::Text => print!("{}", present::to_text(tree)),
    }
}

fn to_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fatal(&format!("failed to encode output: {}", e)))
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &Path) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {}", path.display(), e)))
    }
}

fn parse_json(text: &str, path: &Path) -> serde_json::Value {
    serde_json::from_str(text)
        .unwrap_or_else(|e| fatal(&format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("crestx: {}", msg);
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn accept_flag_becomes_media_type_override() {
        assert_eq!(
            with_accept("#http://e/x/", Some("application/vnd.ccp.eve.Foo-v1+json".into())),
            "#http://e/x/#application/vnd.ccp.eve.Foo-v1+json"
        );
        assert_eq!(with_accept("http://e/x/", None), "http://e/x/");
    }

    #[test]
    fn browse_flags_parse() {
        let cli = Cli::try_parse_from([
            "crestx", "browse", "http://e/", "--format", "json", "--refresh", "30",
        ])
        .unwrap();
        match cli.command {
            Command::Browse {
                address,
                format,
                refresh,
                ..
            } => {
                assert_eq!(address, "http://e/");
                assert_eq!(format, Format::Json);
                assert_eq!(refresh, Some(30));
            }
            _ => panic!("expected browse"),
        }
    }
}
