use std::env;
use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use thiserror::Error;

use db::import::{self, VersionSource, VERSIONS};
use db::models::Reference;
use db::study::settings::DEFAULT_VERSION;
use db::{canon, establish_connection, run_migrations, Catalog, DbCatalog, DbConnection, DbError};

const DEFAULT_DATABASE_URL: &str = "/tmp/lamp.db";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
#[command(name = "lamp", version, about = "Seed and read the Lamp Bible catalog")]
struct Cli {
    /// SQLite database to use (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the 66 canonical books
    Structure,
    /// Download and import Bible versions (all known versions by default)
    Import {
        /// Version id to import; repeat for several
        #[arg(long = "version", value_name = "ID")]
        versions: Vec<String>,
    },
    /// Print row counts per version
    Check,
    /// Print a chapter, or a verse range of it
    Read {
        /// Book id or abbreviation (e.g. jo, 1co, sl)
        book: String,
        /// Chapter, optionally with verses (e.g. 3, 3:16, 3:16-18)
        chapter: String,
        #[arg(long, default_value = DEFAULT_VERSION)]
        version: String,
    },
    /// Search verse text
    Search {
        query: String,
        #[arg(long, default_value = DEFAULT_VERSION)]
        version: String,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Db(#[from] DbError),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Could not download {}: {}", url, cause)]
    Download { url: String, cause: String },

    #[error("Unknown version '{}'. Known versions: {}", id, known)]
    UnknownVersion { id: String, known: String },
}

fn download(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, CliError> {
    let failed = |cause: String| CliError::Download {
        url: url.to_string(),
        cause,
    };
    let response = client.get(url).send().map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(response.status().to_string()));
    }
    let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
    Ok(bytes.to_vec())
}

fn sources(ids: &[String]) -> Result<Vec<&'static VersionSource>, CliError> {
    if ids.is_empty() {
        return Ok(VERSIONS.iter().collect());
    }
    ids.iter()
        .map(|id| {
            VersionSource::find(id).ok_or_else(|| CliError::UnknownVersion {
                id: id.to_owned(),
                known: VERSIONS.iter().map(|v| v.id).collect::<Vec<_>>().join(", "),
            })
        })
        .collect()
}

fn import_versions(ids: &[String], conn: &mut DbConnection) -> Result<(), CliError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| CliError::Download {
            url: String::new(),
            cause: e.to_string(),
        })?;

    for source in sources(ids)? {
        info!("Downloading {} from {}", source.abbreviation, source.url);
        let books = match download(&client, source.url)
            .and_then(|bytes| import::parse_dataset(&bytes).map_err(CliError::from))
        {
            Ok(books) => books,
            Err(e) => {
                error!("Skipping {}: {}", source.id, e);
                continue;
            }
        };

        let report = import::import_version(source, &books, conn)?;
        if !report.unmapped.is_empty() {
            error!(
                "{} has unmapped books: {}",
                source.id,
                report.unmapped.join(", ")
            );
        }
    }

    Ok(())
}

fn check(conn: &mut DbConnection, out: &mut impl Write) -> Result<(), CliError> {
    let counts = import::counts(conn)?;
    writeln!(out, "books: {}", counts.books)?;
    writeln!(out, "chapters: {}", counts.chapters)?;
    for (version, verses) in counts.versions {
        writeln!(out, "{} ({}): {} verses", version.abbreviation, version.id, verses)?;
    }
    Ok(())
}

fn read(
    book: &str,
    chapter: &str,
    version: &str,
    conn: &mut DbConnection,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let reference: Reference = format!("{} {}", book, chapter).parse()?;
    let book_id = canon::book_id_for(&reference.book).unwrap_or(reference.book.as_str());
    let (_, verses) = DbCatalog::chapter(book_id, reference.chapter, version, conn)?;
    let name = DbCatalog::books(conn)?
        .into_iter()
        .find(|b| b.id == book_id)
        .map_or_else(|| book_id.to_string(), |b| b.name);

    let mut shown = 0;
    writeln!(out, "{} {} ({})", name, chapter, version.to_uppercase())?;
    for v in verses.iter().filter(|v| reference.includes(v.number)) {
        writeln!(out, "{} {}", v.number, v.text)?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(out, "No verses in {}", reference)?;
    }
    Ok(())
}

fn search(
    query: &str,
    version: &str,
    conn: &mut DbConnection,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let results = DbCatalog::search(query, version, conn)?;
    if results.is_empty() {
        writeln!(out, "No verses found for '{}'", query)?;
    }
    for r in results {
        writeln!(
            out,
            "{} {}:{} {}",
            r.chapter.book.name, r.chapter.chapter.number, r.verse.number, r.verse.text
        )?;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let url = cli
        .database
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let mut conn = establish_connection(&url)?;
    run_migrations(&mut conn)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Structure => {
            let inserted = import::seed_structure(&mut conn)?;
            writeln!(out, "{} books inserted", inserted)?;
        }
        Command::Import { versions } => import_versions(&versions, &mut conn)?,
        Command::Check => check(&mut conn, &mut out)?,
        Command::Read {
            book,
            chapter,
            version,
        } => read(&book, &chapter, &version, &mut conn, &mut out)?,
        Command::Search { query, version } => search(&query, &version, &mut conn, &mut out)?,
    }
    Ok(())
}

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use db::import::{import_version, SourceBook};

    use super::*;

    fn seeded() -> DbConnection {
        let mut conn = establish_connection(":memory:").unwrap();
        run_migrations(&mut conn).unwrap();
        let john = SourceBook {
            abbrev: "jo".to_string(),
            chapters: vec![vec![
                "No princípio era aquele que é a Palavra.".to_string(),
                "Ele estava com Deus no princípio.".to_string(),
            ]],
        };
        import_version(VersionSource::find("nvi").unwrap(), &[john], &mut conn).unwrap();
        conn
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CliError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_repeated_versions() {
        let cli = Cli::parse_from(["lamp", "import", "--version", "nvi", "--version", "acf"]);
        match cli.command {
            Command::Import { versions } => assert_eq!(versions, vec!["nvi", "acf"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn read_defaults_to_nvi() {
        let cli = Cli::parse_from(["lamp", "read", "jo", "3"]);
        match cli.command {
            Command::Read { version, chapter, .. } => {
                assert_eq!(version, "nvi");
                assert_eq!(chapter, "3");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_versions_are_rejected() {
        assert_eq!(sources(&[]).unwrap().len(), VERSIONS.len());
        assert!(matches!(
            sources(&["kjv".to_string()]),
            Err(CliError::UnknownVersion { .. })
        ));
    }

    #[test]
    fn reads_a_chapter() {
        let mut conn = seeded();
        let text = output(|out| read("jo", "1", "nvi", &mut conn, out));
        assert_eq!(
            text,
            "João 1 (NVI)\n1 No princípio era aquele que é a Palavra.\n2 Ele estava com Deus no princípio.\n"
        );
    }

    #[test]
    fn reads_a_verse_range() {
        let mut conn = seeded();
        let text = output(|out| read("jo", "1:2", "nvi", &mut conn, out));
        assert_eq!(text, "João 1:2 (NVI)\n2 Ele estava com Deus no princípio.\n");

        let mut out = Vec::new();
        assert!(matches!(
            read("jo", "um", "nvi", &mut conn, &mut out),
            Err(CliError::Db(DbError::InvalidReference { .. }))
        ));
    }

    #[test]
    fn searches_and_checks() {
        let mut conn = seeded();
        let text = output(|out| search("Deus", "nvi", &mut conn, out));
        assert_eq!(text, "João 1:2 Ele estava com Deus no princípio.\n");

        let text = output(|out| check(&mut conn, out));
        assert!(text.starts_with("books: 66\nchapters: 1\n"));
        assert!(text.contains("NVI (nvi): 2 verses"));
    }
}
