//! # verity
//!
//! verity is a command-line client for the Verity API. It looks up medical
//! codes, searches Medicare coverage policies and criteria, checks prior
//! authorization requirements and reports Medicaid spending, printing each
//! response as text, JSON or YAML.
//!
//! ## Usage
//!
//! See `verity --help` for usage.
//!
//! ```text,no_run
//! $ export VERITY_API_KEY=vt_live_...
//! $ verity check 99213 --include rvu,policies
//! Code: 99213
//! System: CPT
//! Found: true
//! Description: Office or other outpatient visit, established patient
//!
//! RVU Data:
//!   Work RVU: 1.30
//!   Non-Facility Price: $92.03
//! ```
//!
//! ```text,no_run
//! $ verity -o json prior-auth 27447 -d M17.11 -s TX
//! {
//!   "success": true,
//!   "data": {
//!     "pa_required": true,
//!     ...
//! ```
//!
//! ## Configuration
//!
//! Each setting is taken from the first place it is found: command-line flag,
//! environment variable, config file, built-in default.
//!
//! **~/.verity.yaml**
//! ```text,no_run
//! api_key: vt_live_...
//! base_url: https://verity.backworkai.com/api/v1
//! output: table
//! ```
//!
//! The environment variables are `VERITY_API_KEY`, `VERITY_BASE_URL` and
//! `VERITY_OUTPUT`. Set `VERITY_LOG` (for example `VERITY_LOG=debug`) or pass
//! `-v` to see diagnostics on stderr.

use anyhow::{anyhow, bail, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::io::stdout;
use std::path::PathBuf;
use verity::commands::{
    self, coverage, policies, prior_auth, Check, Command, CoverageSearch, Health, Jurisdictions,
    PoliciesList, PolicyGet, PriorAuth, Spending,
};
use verity::output::print::FormattedOutputter;
use verity::{logging, ApiError, ClientError, Config, ConfigOverrides, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let matches = app().get_matches();
    let chain = subcommand_chain(&matches);

    logging::init(verbosity(&chain));

    if let Err(err) = run(&chain) {
        eprintln!("Error: {}", err);
        if let Some(ClientError::Api(ApiError {
            hint: Some(hint), ..
        })) = err.downcast_ref::<ClientError>()
        {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    App::new("verity")
        .version(VERSION)
        .about("Verity CLI - Medicare coverage policies and prior authorization")
        .after_help("Get your API key from: https://verity.backworkai.com/dashboard")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("CONFIG")
                .long("config")
                .takes_value(true)
                .global(true)
                .help("config file (default is $HOME/.verity.yaml)"),
        )
        .arg(
            Arg::with_name("API_KEY")
                .long("api-key")
                .takes_value(true)
                .global(true)
                .help("Verity API key (or set VERITY_API_KEY env var)"),
        )
        .arg(
            Arg::with_name("BASE_URL")
                .long("base-url")
                .takes_value(true)
                .global(true)
                .help("API base URL [default: https://verity.backworkai.com/api/v1]"),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .long("output")
                .takes_value(true)
                .global(true)
                .possible_values(&OutputFormat::VARIANTS)
                .help("Output format [default: table]"),
        )
        .arg(
            Arg::with_name("VERBOSE")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Log more details to stderr (repeat for more)"),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Look up a medical code (CPT, HCPCS, ICD-10, NDC) and get coverage information")
                .arg(Arg::with_name("CODE").required(true).index(1))
                .arg(
                    Arg::with_name("INCLUDE")
                        .short("i")
                        .long("include")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Include additional data (rvu, policies)"),
                )
                .arg(
                    Arg::with_name("JURISDICTION")
                        .short("j")
                        .long("jurisdiction")
                        .takes_value(true)
                        .help("Filter by MAC jurisdiction"),
                )
                .arg(
                    Arg::with_name("NO_FUZZY")
                        .long("no-fuzzy")
                        .help("Disable fuzzy matching"),
                ),
        )
        .subcommand(
            SubCommand::with_name("coverage")
                .about("Search coverage criteria")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("search")
                        .about("Search coverage criteria text across all policies")
                        .arg(Arg::with_name("QUERY").required(true).index(1))
                        .arg(
                            Arg::with_name("SECTION")
                                .short("s")
                                .long("section")
                                .takes_value(true)
                                .help("Filter by section (indications, limitations, documentation)"),
                        )
                        .arg(
                            Arg::with_name("TYPE")
                                .short("t")
                                .long("type")
                                .takes_value(true)
                                .help("Policy type (LCD, Article, NCD)"),
                        )
                        .arg(
                            Arg::with_name("JURISDICTION")
                                .short("j")
                                .long("jurisdiction")
                                .takes_value(true)
                                .help("MAC jurisdiction"),
                        )
                        .arg(
                            Arg::with_name("LIMIT")
                                .short("l")
                                .long("limit")
                                .default_value("50")
                                .validator(is_valid_limit)
                                .help("Results per page (1-100)"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("health")
                .about("Check the health status of the Verity API including database and Redis checks"),
        )
        .subcommand(
            SubCommand::with_name("jurisdictions")
                .about("List all Medicare Administrative Contractor (MAC) jurisdictions"),
        )
        .subcommand(
            SubCommand::with_name("policies")
                .about("Search and list coverage policies, or get details of a specific policy")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("list")
                        .about("Search and list policies")
                        .arg(
                            Arg::with_name("QUERY")
                                .short("q")
                                .long("query")
                                .takes_value(true)
                                .help("Search query"),
                        )
                        .arg(
                            Arg::with_name("MODE")
                                .short("m")
                                .long("mode")
                                .default_value(policies::DEFAULT_MODE)
                                .possible_values(&["keyword", "semantic"])
                                .help("Search mode"),
                        )
                        .arg(
                            Arg::with_name("TYPE")
                                .short("t")
                                .long("type")
                                .takes_value(true)
                                .help("Policy type (LCD, Article, NCD)"),
                        )
                        .arg(
                            Arg::with_name("JURISDICTION")
                                .short("j")
                                .long("jurisdiction")
                                .takes_value(true)
                                .help("MAC jurisdiction"),
                        )
                        .arg(
                            Arg::with_name("STATUS")
                                .short("s")
                                .long("status")
                                .default_value(policies::DEFAULT_STATUS)
                                .possible_values(&["active", "retired", "all"])
                                .help("Status"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("get")
                        .about("Get policy details")
                        .arg(Arg::with_name("POLICY_ID").required(true).index(1))
                        .arg(
                            Arg::with_name("INCLUDE")
                                .short("i")
                                .long("include")
                                .takes_value(true)
                                .multiple(true)
                                .number_of_values(1)
                                .help("Include additional data (criteria, codes, attachments, versions)"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("prior-auth")
                .about("Check if procedures require prior authorization based on codes and state")
                .arg(
                    Arg::with_name("PROCEDURE_CODES")
                        .required(true)
                        .multiple(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("DIAGNOSIS")
                        .short("d")
                        .long("diagnosis")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Diagnosis codes (ICD-10)"),
                )
                .arg(
                    Arg::with_name("STATE")
                        .short("s")
                        .long("state")
                        .takes_value(true)
                        .help("Two-letter state code"),
                )
                .arg(
                    Arg::with_name("PAYER")
                        .short("p")
                        .long("payer")
                        .default_value(prior_auth::DEFAULT_PAYER)
                        .help("Payer (medicare, aetna, uhc, all)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("spending")
                .about("Returns aggregate Medicaid provider spending statistics per HCPCS code")
                .arg(
                    Arg::with_name("CODES")
                        .required(true)
                        .multiple(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("YEAR")
                        .short("y")
                        .long("year")
                        .takes_value(true)
                        .validator(is_valid_year)
                        .help("Filter to a specific year"),
                ),
        )
}

fn run(chain: &[&ArgMatches]) -> Result<()> {
    let overrides = ConfigOverrides {
        config_file: global_value(chain, "CONFIG").map(PathBuf::from),
        api_key: global_value(chain, "API_KEY"),
        base_url: global_value(chain, "BASE_URL"),
        output: global_value(chain, "OUTPUT"),
    };
    let config = Config::load(overrides)?;
    let command = command(chain[0])?;
    let client = config.client()?;

    let stdout = stdout();
    let mut stdout = stdout.lock();
    let mut outputter = FormattedOutputter::new(&mut stdout, config.output);

    commands::run(command.as_ref(), &client, &mut outputter)
}

fn command(matches: &ArgMatches) -> Result<Box<dyn Command>> {
    let command: Box<dyn Command> = match matches.subcommand() {
        ("check", Some(m)) => Box::new(Check {
            code: required(m, "CODE")?,
            include: list(m, "INCLUDE"),
            jurisdiction: optional(m, "JURISDICTION"),
            fuzzy: !m.is_present("NO_FUZZY"),
        }),
        ("coverage", Some(m)) => match m.subcommand() {
            ("search", Some(m)) => Box::new(CoverageSearch {
                query: required(m, "QUERY")?,
                section: optional(m, "SECTION"),
                policy_type: optional(m, "TYPE"),
                jurisdiction: optional(m, "JURISDICTION"),
                limit: number(m, "LIMIT")?.unwrap_or(coverage::DEFAULT_LIMIT),
            }),
            (name, _) => bail!("unknown coverage command '{}'", name),
        },
        ("health", Some(_)) => Box::new(Health),
        ("jurisdictions", Some(_)) => Box::new(Jurisdictions),
        ("policies", Some(m)) => match m.subcommand() {
            ("list", Some(m)) => Box::new(PoliciesList {
                query: optional(m, "QUERY"),
                mode: required(m, "MODE")?,
                policy_type: optional(m, "TYPE"),
                jurisdiction: optional(m, "JURISDICTION"),
                status: required(m, "STATUS")?,
            }),
            ("get", Some(m)) => Box::new(PolicyGet {
                policy_id: required(m, "POLICY_ID")?,
                include: list(m, "INCLUDE"),
            }),
            (name, _) => bail!("unknown policies command '{}'", name),
        },
        ("prior-auth", Some(m)) => Box::new(PriorAuth {
            procedure_codes: list(m, "PROCEDURE_CODES"),
            diagnosis_codes: list(m, "DIAGNOSIS"),
            state: optional(m, "STATE"),
            payer: required(m, "PAYER")?,
        }),
        ("spending", Some(m)) => Box::new(Spending {
            codes: list(m, "CODES"),
            year: number(m, "YEAR")?,
        }),
        (name, _) => bail!("unknown command '{}'", name),
    };
    Ok(command)
}

/// The top-level matches followed by each nested subcommand's matches.
fn subcommand_chain<'a, 'b>(matches: &'a ArgMatches<'b>) -> Vec<&'a ArgMatches<'b>> {
    let mut chain = vec![matches];
    let mut current = matches;
    while let (_, Some(sub)) = current.subcommand() {
        chain.push(sub);
        current = sub;
    }
    chain
}

/// Global flags may appear before or after a subcommand; the innermost wins.
fn global_value(chain: &[&ArgMatches], name: &str) -> Option<String> {
    chain
        .iter()
        .rev()
        .find_map(|matches| matches.value_of(name))
        .map(String::from)
}

fn verbosity(chain: &[&ArgMatches]) -> u64 {
    chain
        .iter()
        .map(|matches| matches.occurrences_of("VERBOSE"))
        .max()
        .unwrap_or(0)
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .value_of(name)
        .map(String::from)
        .ok_or_else(|| anyhow!("missing required argument {}", name))
}

fn optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches
        .value_of(name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Every value of a repeatable argument, with comma-separated lists split apart.
fn list(matches: &ArgMatches, name: &str) -> Vec<String> {
    matches
        .values_of(name)
        .map(|values| {
            values
                .flat_map(|value| value.split(','))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn number(matches: &ArgMatches, name: &str) -> Result<Option<u32>> {
    match matches.value_of(name) {
        Some(value) => Ok(Some(value.parse()?)),
        None => Ok(None),
    }
}

fn is_valid_limit(val: String) -> Result<(), String> {
    match val.parse::<u32>() {
        Ok(limit) if (1..=100).contains(&limit) => Ok(()),
        _ => Err(String::from("Limit must be an integer from 1 to 100")),
    }
}

fn is_valid_year(val: String) -> Result<(), String> {
    match val.parse::<u32>() {
        Ok(year) if year > 0 => Ok(()),
        _ => Err(String::from("Year is not a valid integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches<'static> {
        app().get_matches_from_safe(args).expect("arguments parse")
    }

    #[test]
    fn builds_check_command() {
        let matches = parse(&[
            "verity", "check", "99213", "-i", "rvu,policies", "-j", "JM", "--no-fuzzy",
        ]);

        assert_eq!(command(&matches).unwrap().name(), "check");

        let (_, Some(m)) = matches.subcommand() else {
            panic!("check subcommand");
        };
        assert_eq!(required(m, "CODE").unwrap(), "99213");
        assert_eq!(list(m, "INCLUDE"), vec!["rvu", "policies"]);
        assert_eq!(optional(m, "JURISDICTION").as_deref(), Some("JM"));
        assert!(m.is_present("NO_FUZZY"));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let matches = parse(&[
            "verity",
            "--api-key",
            "outer",
            "policies",
            "get",
            "L33831",
            "-o",
            "json",
        ]);
        let chain = subcommand_chain(&matches);

        assert_eq!(chain.len(), 3);
        assert_eq!(global_value(&chain, "API_KEY").as_deref(), Some("outer"));
        assert_eq!(global_value(&chain, "OUTPUT").as_deref(), Some("json"));
        assert_eq!(global_value(&chain, "BASE_URL"), None);
    }

    #[test]
    fn repeated_and_comma_separated_values_combine() {
        let matches = parse(&[
            "verity", "prior-auth", "27447", "27446", "-d", "M17.11,M17.12", "-d", "E66.9",
        ]);
        let (_, Some(m)) = matches.subcommand() else {
            panic!("prior-auth subcommand");
        };

        assert_eq!(list(m, "PROCEDURE_CODES"), vec!["27447", "27446"]);
        assert_eq!(list(m, "DIAGNOSIS"), vec!["M17.11", "M17.12", "E66.9"]);
        assert_eq!(required(m, "PAYER").unwrap(), "medicare");
    }

    #[test]
    fn defaults_fill_policies_list() {
        let matches = parse(&["verity", "policies", "list"]);

        let command = command(&matches).unwrap();

        assert_eq!(command.name(), "policies list");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(app()
            .get_matches_from_safe(&["verity", "coverage", "search", "knee", "-l", "0"])
            .is_err());
        assert!(app()
            .get_matches_from_safe(&["verity", "spending", "J1745", "-y", "soon"])
            .is_err());
        assert!(app()
            .get_matches_from_safe(&["verity", "-o", "xml", "health"])
            .is_err());
    }

    #[test]
    fn verbosity_counts_flags() {
        let matches = parse(&["verity", "-vv", "health"]);

        assert_eq!(verbosity(&subcommand_chain(&matches)), 2);
    }
}
