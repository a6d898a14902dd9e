use super::Host;
use super::common::{Common, CommonArgs, DocumentArgs, ReportArgs};
use crate::Result;
use crate::reports::ReportTable;
use crate::table::{GroupingPolicy, TableDef, build_grouped_table};
use clap::Parser;
use compact_str::CompactString;
use log::debug;
use ohno::app_err;

const LOG_TARGET: &str = "    tables";

#[derive(Parser, Debug)]
pub struct TablesArgs {
    /// Only build these tables (default is every configured table)
    #[arg(long = "table", short = 't', value_name = "NAME")]
    pub tables: Vec<CompactString>,

    /// How to collapse rows sharing unique-column values, overriding the configuration
    #[arg(long, value_name = "POLICY")]
    pub grouping: Option<GroupingPolicy>,

    #[command(flatten)]
    pub documents: DocumentArgs,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn process_tables<H: Host>(host: &mut H, args: &TablesArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;

    let selected: Vec<&TableDef> = if args.tables.is_empty() {
        common.config.tables.iter().collect()
    } else {
        args.tables.iter().map(|name| common.config.table(name)).collect::<Result<_>>()?
    };

    let named = common.config.extractor_map()?;
    let specs = selected
        .iter()
        .map(|def| Ok((*def, def.resolve(&named)?)))
        .collect::<Result<Vec<_>>>()?;

    let documents = common.load_documents(&args.documents)?;

    let mut tables = Vec::with_capacity(specs.len());
    for (def, spec) in &specs {
        let policy = common.config.grouping_for(def, args.grouping);
        debug!(target: LOG_TARGET, "building table '{}' with grouping '{policy}'", def.name);

        let table = build_grouped_table(&documents, spec, policy).map_err(|e| app_err!("table '{}': {e}", def.name))?;
        tables.push(ReportTable::new(def.name.clone(), table));
    }

    common.report(&args.report, &tables, &[])
}
