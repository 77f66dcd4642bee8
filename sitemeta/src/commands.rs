use clap::arg;
use sitemeta_core::crawl::DEFAULT_OUTPUT_DIR;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitemeta")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitemeta")
        .about("Crawl a site and suggest the SEO metadata each page is missing")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<DOMAIN>)
                .required(true)
                .help("Domain or URL to crawl, e.g. example.com (https is assumed)"),
        )
        .arg(
            arg!(--"max" <N>)
                .required(false)
                .help("Maximum number of pages to audit")
                .value_parser(clap::value_parser!(usize))
                .default_value("500"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-o --"output" <DIR>)
                .required(false)
                .help("Directory for seo_report.json and seo_report.html")
                .default_value(DEFAULT_OUTPUT_DIR),
        )
        .arg(
            arg!(--"model" <NAME>)
                .required(false)
                .help("Local model used to draft suggestions (default: heuristics only)")
                .env("SITEMETA_MODEL"),
        )
        .arg(
            arg!(--"delay-ms" <MS>)
                .required(false)
                .help("Pause before every request, in milliseconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("200"),
        )
}
