use super::Host;
use super::common::{Common, CommonArgs, DocumentArgs, ReportArgs};
use crate::Result;
use crate::measurements::consolidate_measurements;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct MeasurementsArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn process_measurements<H: Host>(host: &mut H, args: &MeasurementsArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let documents = common.load_documents(&args.documents)?;
    let measurements = consolidate_measurements(&documents);

    common.report(&args.report, &[], &measurements)
}
