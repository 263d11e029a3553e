use std::time::Duration;

use bqxfer::dumper::DumpConfig;
use bqxfer::http::job::WriteDisposition;
use bqxfer::loader::{LoadConfig, LoadOptions};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Load files into BigQuery and dump query results", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Service account key file
    #[arg(long, global = true, env = "GOOGLE_APPLICATION_CREDENTIALS", default_value = "")]
    pub credentials: String,

    /// Proxy URL applied to every request, e.g. http://proxy:3128
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// BigQuery endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// More logging; repeat for trace output. RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a .json (newline-delimited) or .csv file into a table
    Load(LoadArgs),
    /// Run a query and write the rows to a JSON or CSV file
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[arg(long)]
    pub project: String,

    #[arg(long)]
    pub dataset: String,

    #[arg(long)]
    pub table: String,

    /// JSON array of table fields
    #[arg(long)]
    pub schema: String,

    /// Source data, .json or .csv
    #[arg(long)]
    pub source: String,

    /// Seconds between job status checks
    #[arg(long, default_value_t = 3)]
    pub poll_interval_secs: u64,

    /// Give up waiting for the job after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// WRITE_APPEND, WRITE_TRUNCATE or WRITE_EMPTY
    #[arg(long)]
    pub write_disposition: Option<WriteDisposition>,

    /// Header rows to skip in a CSV source
    #[arg(long)]
    pub skip_leading_rows: Option<i64>,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[arg(long)]
    pub project: String,

    #[arg(long)]
    pub output: String,

    /// json or csv
    #[arg(long, default_value = "json")]
    pub format: String,

    /// CSV delimiter; "tab" for a tab
    #[arg(long, default_value = "")]
    pub delimiter: String,

    #[arg(long)]
    pub query: String,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write a CSV header row
    #[arg(long)]
    pub header: bool,

    /// How long each query call may wait for the job, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub timeout_ms: i64,

    /// Do not use cached query results
    #[arg(long)]
    pub no_cache: bool,

    /// Give up waiting for an unfinished query after this many seconds
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,
}

impl LoadArgs {
    pub fn into_config(self, global: &GlobalArgs, options: LoadOptions) -> LoadConfig {
        LoadConfig {
            project_id: self.project,
            dataset_id: self.dataset,
            table_id: self.table,
            credentials_path: global.credentials.clone(),
            schema_path: self.schema,
            source_path: self.source,
            proxy: global.proxy.clone(),
            endpoint: global.endpoint.clone(),
            options: LoadOptions {
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                timeout: self.timeout_secs.map(Duration::from_secs),
                write_disposition: self.write_disposition,
                skip_leading_rows: self.skip_leading_rows,
                ..options
            },
        }
    }
}

impl DumpArgs {
    pub fn into_config(self, global: &GlobalArgs) -> DumpConfig {
        DumpConfig {
            project_id: self.project,
            credentials_path: global.credentials.clone(),
            output_path: self.output,
            format: self.format,
            delimiter: self.delimiter,
            query: self.query,
            proxy: global.proxy.clone(),
            endpoint: global.endpoint.clone(),
            pretty: self.pretty,
            header: self.header,
            timeout_ms: self.timeout_ms,
            no_cache: self.no_cache,
            wait_timeout: self.wait_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl GlobalArgs {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", "/etc/keys/sa.json");
        let cli = Cli::try_parse_from(["bqxfer", "dump", "--project", "p", "--output", "o.json", "--query", "q"]);
        std::env::remove_var("GOOGLE_APPLICATION_CREDENTIALS");
        let cli = cli.unwrap();
        assert_eq!(cli.global.credentials, "/etc/keys/sa.json");
        assert_eq!(cli.global.log_level(), "info");
    }

    #[test]
    #[serial]
    fn test_parse_load() {
        let cli = Cli::try_parse_from([
            "bqxfer",
            "--credentials",
            "key.json",
            "load",
            "--project",
            "p",
            "--dataset",
            "d",
            "--table",
            "t",
            "--schema",
            "schema.json",
            "--source",
            "data.csv",
            "--write-disposition",
            "WRITE_TRUNCATE",
            "--skip-leading-rows",
            "1",
            "--timeout-secs",
            "60",
        ])
        .unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load");
        };
        let config = args.into_config(&cli.global, LoadOptions::default());
        assert_eq!(config.credentials_path, "key.json");
        assert_eq!(config.source_path, "data.csv");
        assert_eq!(config.options.poll_interval, Duration::from_secs(3));
        assert_eq!(config.options.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.options.write_disposition, Some(WriteDisposition::WriteTruncate));
        assert_eq!(config.options.skip_leading_rows, Some(1));
    }

    #[test]
    #[serial]
    fn test_parse_dump() {
        let cli = Cli::try_parse_from([
            "bqxfer",
            "dump",
            "--credentials",
            "key.json",
            "--project",
            "p",
            "--output",
            "out.csv",
            "--format",
            "csv",
            "--delimiter",
            "tab",
            "--query",
            "SELECT 1",
            "--header",
            "--no-cache",
            "--wait-timeout-secs",
            "30",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.log_level(), "trace");
        let Commands::Dump(args) = cli.command else {
            panic!("expected dump");
        };
        let config = args.into_config(&cli.global);
        assert_eq!(config.credentials_path, "key.json");
        assert_eq!(config.delimiter, "tab");
        assert!(config.header);
        assert!(config.no_cache);
        assert_eq!(config.wait_timeout, Some(Duration::from_secs(30)));
        assert!(!config.pretty);
    }

    #[test]
    fn test_missing_required_flag() {
        assert!(Cli::try_parse_from(["bqxfer", "dump", "--project", "p"]).is_err());
    }
}
