use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile one view filter and print the SQL it produces
    Filter {
        #[arg(long, help = "Schema JSON file path")]
        schema: PathBuf,

        #[arg(long, help = "Table holding the field")]
        table: String,

        #[arg(long, help = "Field to filter on")]
        field: String,

        #[arg(long = "type", help = "Filter type, e.g. \"contains\" or \"date_equal\"")]
        filter_type: String,

        #[arg(long, default_value = "", help = "Raw filter value")]
        value: String,

        #[arg(
            long,
            help = "Instant to use as now, RFC 3339 or naive in the default timezone"
        )]
        timezone_now: Option<String>,
    },
    /// Type a formula field and print the typed expression as JSON
    TypeFormula {
        #[arg(long, help = "Schema JSON file path")]
        schema: PathBuf,

        #[arg(long, help = "Table holding the field")]
        table: String,

        #[arg(long, help = "Formula field to type")]
        field: String,
    },
    /// List the registered filter types and the fields they accept
    FilterTypes {
        #[arg(long, requires_all = ["table", "field"], help = "Only list types compatible with a field of this schema")]
        schema: Option<PathBuf>,

        #[arg(long)]
        table: Option<String>,

        #[arg(long)]
        field: Option<String>,
    },
}
