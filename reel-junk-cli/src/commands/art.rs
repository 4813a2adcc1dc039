use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use serde::Serialize;

use super::Overrides;
use crate::error::CliError;

#[derive(Serialize)]
struct ArtLine {
    title: String,
    poster: Option<String>,
}

/// Resolve the best poster for each title.
pub(crate) fn run_art(
    overrides: &Overrides,
    mut titles: Vec<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    if let Some(path) = &file {
        let contents = std::fs::read_to_string(path)?;
        titles.extend(read_titles(&contents));
    }
    if titles.is_empty() {
        return Err(CliError::input("no titles given (pass titles or --file)"));
    }

    let rt = super::build_runtime()?;
    let posters = rt.block_on(async {
        let resolver = super::build_resolver(overrides)?;
        let pb = crate::spinner::start(
            format!("Resolving {} title(s)...", titles.len()),
            overrides.quiet || json,
        );
        let posters = resolver.best_art_batch(titles.clone()).await;
        pb.finish_and_clear();
        resolver.shutdown().await;
        Ok::<_, CliError>(posters)
    })?;

    if json {
        let lines: Vec<ArtLine> = titles
            .into_iter()
            .zip(posters)
            .map(|(title, poster)| ArtLine { title, poster })
            .collect();
        return super::print_json(&lines);
    }

    let mut found = 0;
    for (title, poster) in titles.iter().zip(&posters) {
        match poster {
            Some(url) => {
                found += 1;
                log::info!(
                    "{} {}",
                    "\u{2714}".if_supports_color(Stderr, |t| t.green()),
                    title.if_supports_color(Stderr, |t| t.bold()),
                );
                log::info!("    {}", url.if_supports_color(Stderr, |t| t.cyan()));
            }
            None => {
                log::info!(
                    "{} {} {}",
                    "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                    title.if_supports_color(Stderr, |t| t.bold()),
                    "(no artwork)".if_supports_color(Stderr, |t| t.dimmed()),
                );
            }
        }
    }
    log::info!("");
    log::info!("Found artwork for {}/{} title(s)", found, titles.len());
    Ok(())
}

/// One title per non-blank line; lines starting with `#` are comments.
fn read_titles(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_titles_skips_blanks_and_comments() {
        let titles = read_titles("O Dia Seguinte\n\n# watched\n  Alien  \n");
        assert_eq!(titles, vec!["O Dia Seguinte", "Alien"]);
    }
}
