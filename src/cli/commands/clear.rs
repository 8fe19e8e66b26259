use crate::app::App;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Clear { reports } = cmd {
        if !*reports {
            info("Nothing to clear, pass --reports");
            return Ok(());
        }

        let app = App::open(cfg)?;
        app.reports.clear_reports()?;
        app.store()
            .log("clear_reports", "reports", "cached reports removed")?;
        success("Cached reports removed.");
    }

    Ok(())
}
