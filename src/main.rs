mod entry;
mod logger;

use summary_cache::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
