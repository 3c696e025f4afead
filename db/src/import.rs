//! Populates the catalog from the public JSON Bible datasets.
//!
//! Importing a version reconciles its verses with the dataset inside one
//! transaction: verses keep their ids (and so their bookmarks) when
//! re-imported, changed texts are updated in place, and verses the dataset
//! no longer has are removed. Re-running an import leaves exactly the
//! dataset's verse count.
use std::collections::HashMap;

use diesel::prelude::*;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::canon;
use crate::models::{BibleVersion, NewVerse};
use crate::{DbConnection, DbError};

/// Number of verse rows per INSERT statement.
const VERSE_BATCH_SIZE: usize = 500;

/// Language of every bundled dataset.
pub const DATASET_LANGUAGE: &str = "pt-BR";

/// A version that can be imported, with where to download its text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VersionSource {
    pub id: &'static str,
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

/// Versions the importer knows about. ARC has no open dataset and is
/// served from the ACF text; ARA uses the AA dataset.
pub const VERSIONS: [VersionSource; 4] = [
    VersionSource {
        id: "nvi",
        name: "Nova Versão Internacional",
        abbreviation: "NVI",
        description: "Linguagem moderna e acessível",
        url: "https://raw.githubusercontent.com/thiagobodruk/biblia/master/json/nvi.json",
    },
    VersionSource {
        id: "acf",
        name: "Almeida Corrigida Fiel",
        abbreviation: "ACF",
        description: "Tradução clássica e fiel aos textos originais (SBTB)",
        url: "https://raw.githubusercontent.com/thiagobodruk/biblia/master/json/acf.json",
    },
    VersionSource {
        id: "arc",
        name: "Almeida Revista e Corrigida",
        abbreviation: "ARC",
        description: "Tradução clássica da Assembleia de Deus",
        url: "https://raw.githubusercontent.com/thiagobodruk/biblia/master/json/acf.json",
    },
    VersionSource {
        id: "ara",
        name: "Almeida Revista e Atualizada",
        abbreviation: "ARA",
        description: "Equilíbrio entre fidelidade e clareza",
        url: "https://raw.githubusercontent.com/thiagobodruk/biblia/master/json/aa.json",
    },
];

impl VersionSource {
    pub fn find(id: &str) -> Option<&'static VersionSource> {
        VERSIONS.iter().find(|v| v.id == id)
    }

    fn to_row(&self) -> BibleVersion {
        BibleVersion {
            id: self.id.to_string(),
            name: self.name.to_string(),
            abbreviation: self.abbreviation.to_string(),
            language: DATASET_LANGUAGE.to_string(),
            description: Some(self.description.to_string()),
        }
    }
}

/// One book of a dataset: its abbreviation and the verse texts of each
/// chapter, in order.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SourceBook {
    pub abbrev: String,
    pub chapters: Vec<Vec<String>>,
}

/// Outcome of importing one version.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub version: String,
    pub books: usize,
    pub verses: usize,
    pub unmapped: Vec<String>,
}

/// Row counts used to check an import.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogCounts {
    pub versions: Vec<(BibleVersion, i64)>,
    pub books: i64,
    pub chapters: i64,
}

/// Parses a downloaded dataset. The published files start with a UTF-8
/// byte order mark, which is skipped.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<SourceBook>, DbError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    serde_json::from_slice(bytes).map_err(|e| DbError::Dataset {
        cause: e.to_string(),
    })
}

/// Inserts the canonical books, leaving existing rows untouched.
///
/// Returns the number of books that were newly inserted.
pub fn seed_structure(conn: &mut DbConnection) -> Result<usize, DbError> {
    use crate::schema::books;

    let inserted = diesel::insert_or_ignore_into(books::table)
        .values(&canon::books())
        .execute(conn)?;
    info!("Seeded {} new books", inserted);
    Ok(inserted)
}

/// Imports the verses of one version, replacing any previous import of it.
pub fn import_version(
    source: &VersionSource,
    books: &[SourceBook],
    conn: &mut DbConnection,
) -> Result<ImportReport, DbError> {
    use crate::schema::{bible_versions, verses};

    conn.transaction::<_, DbError, _>(|conn| {
        seed_structure(conn)?;

        let row = source.to_row();
        diesel::insert_into(bible_versions::table)
            .values(&row)
            .on_conflict(bible_versions::id)
            .do_update()
            .set((
                bible_versions::name.eq(&row.name),
                bible_versions::abbreviation.eq(&row.abbreviation),
                bible_versions::description.eq(&row.description),
            ))
            .execute(conn)?;

        // Verses of a previous import, by (chapter, number).
        let mut existing: HashMap<(i32, i32), (i32, String)> = verses::table
            .filter(verses::bible_version_id.eq(source.id))
            .select((verses::id, verses::chapter_id, verses::number, verses::text))
            .load::<(i32, i32, i32, String)>(conn)?
            .into_iter()
            .map(|(id, chapter_id, number, text)| ((chapter_id, number), (id, text)))
            .collect();
        let mut updated = 0;

        let mut report = ImportReport {
            version: source.id.to_string(),
            ..ImportReport::default()
        };

        for book in books {
            let book_id = match canon::book_id_for(&book.abbrev) {
                Some(id) => id,
                None => {
                    warn!(
                        "Skipping unmapped book '{}' in {} dataset",
                        book.abbrev, source.id
                    );
                    report.unmapped.push(book.abbrev.to_owned());
                    continue;
                }
            };

            for (index, texts) in book.chapters.iter().enumerate() {
                let chapter_id = find_or_create_chapter(book_id, index as i32 + 1, conn)?;
                let mut rows = Vec::new();
                for (i, text) in texts.iter().enumerate() {
                    let number = i as i32 + 1;
                    match existing.remove(&(chapter_id, number)) {
                        Some((_, old)) if old == *text => {}
                        Some((id, _)) => {
                            diesel::update(verses::table.find(id))
                                .set(verses::text.eq(text))
                                .execute(conn)?;
                            updated += 1;
                        }
                        None => rows.push(NewVerse {
                            chapter_id,
                            number,
                            text,
                            bible_version_id: source.id,
                        }),
                    }
                }

                for batch in rows.chunks(VERSE_BATCH_SIZE) {
                    diesel::insert_into(verses::table)
                        .values(batch)
                        .execute(conn)?;
                }
                report.verses += texts.len();
            }

            report.books += 1;
            debug!("{}: imported {}", source.abbreviation, book_id);
        }

        let stale: Vec<i32> = existing.into_values().map(|(id, _)| id).collect();
        for batch in stale.chunks(VERSE_BATCH_SIZE) {
            diesel::delete(verses::table.filter(verses::id.eq_any(batch))).execute(conn)?;
        }
        if updated > 0 || !stale.is_empty() {
            info!(
                "{}: {} verses updated, {} removed since the previous import",
                source.abbreviation,
                updated,
                stale.len()
            );
        }

        info!(
            "{} imported: {} books, {} verses",
            source.abbreviation, report.books, report.verses
        );
        Ok(report)
    })
}

/// Gets the id of a chapter, creating the chapter first if needed.
fn find_or_create_chapter(
    book_id: &str,
    number: i32,
    conn: &mut DbConnection,
) -> Result<i32, DbError> {
    use crate::schema::chapters;

    diesel::insert_or_ignore_into(chapters::table)
        .values((chapters::book_id.eq(book_id), chapters::number.eq(number)))
        .execute(conn)?;

    chapters::table
        .filter(chapters::book_id.eq(book_id))
        .filter(chapters::number.eq(number))
        .select(chapters::id)
        .first(conn)
        .map_err(DbError::from)
}

/// Counts verses per version plus book and chapter totals.
pub fn counts(conn: &mut DbConnection) -> Result<CatalogCounts, DbError> {
    use crate::schema::{bible_versions, books, chapters, verses};

    let versions = bible_versions::table
        .order_by(bible_versions::id.asc())
        .load::<BibleVersion>(conn)?;

    let mut per_version = Vec::with_capacity(versions.len());
    for version in versions {
        let count = verses::table
            .filter(verses::bible_version_id.eq(&version.id))
            .count()
            .get_result::<i64>(conn)?;
        per_version.push((version, count));
    }

    Ok(CatalogCounts {
        versions: per_version,
        books: books::table.count().get_result(conn)?,
        chapters: chapters::table.count().get_result(conn)?,
    })
}
