pub mod crawl;
pub mod error;
pub mod extract;
pub mod model;
pub mod oracle;
pub mod report;
pub mod stopwords;
pub mod suggest;

use colored::Colorize;

pub use error::{CoreError, Result};
pub use model::{FieldMap, FieldName, PageRecord, SeoReport, SuggestionMethod, SuggestionRecord};

pub fn print_banner() {
    let banner = r#"
     _ _                      _
 ___(_) |_ ___ _ __ ___   ___| |_ __ _
/ __| | __/ _ \ '_ ` _ \ / _ \ __/ _` |
\__ \ | ||  __/ | | | | |  __/ || (_| |
|___/_|\__\___|_| |_| |_|\___|\__\__,_|
"#;
    println!("{}", banner.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "crawl a site, find the metadata it is missing".white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
