//! The canonical book table and the mapping from dataset abbreviations
//! to canonical book ids.
use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::models::{Book, Testament};
use crate::models::Testament::{New, Old};

/// Books in canonical order: id, name, testament, chapter count.
pub const BOOKS: [(&str, &str, Testament, i32); 66] = [
    ("gen", "Gênesis", Old, 50),
    ("exo", "Êxodo", Old, 40),
    ("lev", "Levítico", Old, 27),
    ("num", "Números", Old, 36),
    ("deu", "Deuteronômio", Old, 34),
    ("jos", "Josué", Old, 24),
    ("jui", "Juízes", Old, 21),
    ("rut", "Rute", Old, 4),
    ("1sa", "1 Samuel", Old, 31),
    ("2sa", "2 Samuel", Old, 24),
    ("1rs", "1 Reis", Old, 22),
    ("2rs", "2 Reis", Old, 25),
    ("1cr", "1 Crônicas", Old, 29),
    ("2cr", "2 Crônicas", Old, 36),
    ("edr", "Esdras", Old, 10),
    ("nee", "Neemias", Old, 13),
    ("est", "Ester", Old, 10),
    ("job", "Jó", Old, 42),
    ("sl", "Salmos", Old, 150),
    ("pv", "Provérbios", Old, 31),
    ("ec", "Eclesiastes", Old, 12),
    ("ct", "Cantares", Old, 8),
    ("is", "Isaías", Old, 66),
    ("jr", "Jeremias", Old, 52),
    ("lm", "Lamentações", Old, 5),
    ("ez", "Ezequiel", Old, 48),
    ("dn", "Daniel", Old, 12),
    ("os", "Oséias", Old, 14),
    ("jl", "Joel", Old, 3),
    ("am", "Amós", Old, 9),
    ("ob", "Obadias", Old, 1),
    ("jn", "Jonas", Old, 4),
    ("mq", "Miquéias", Old, 7),
    ("na", "Naum", Old, 3),
    ("hc", "Habacuque", Old, 3),
    ("sf", "Sofonias", Old, 3),
    ("ag", "Ageu", Old, 2),
    ("zc", "Zacarias", Old, 14),
    ("ml", "Malaquias", Old, 4),
    ("mt", "Mateus", New, 28),
    ("mc", "Marcos", New, 16),
    ("lc", "Lucas", New, 24),
    ("jo", "João", New, 21),
    ("at", "Atos", New, 28),
    ("rm", "Romanos", New, 16),
    ("1co", "1 Coríntios", New, 16),
    ("2co", "2 Coríntios", New, 13),
    ("gl", "Gálatas", New, 6),
    ("ef", "Efésios", New, 6),
    ("fp", "Filipenses", New, 4),
    ("cl", "Colossenses", New, 4),
    ("1ts", "1 Tessalonicenses", New, 5),
    ("2ts", "2 Tessalonicenses", New, 3),
    ("1tm", "1 Timóteo", New, 6),
    ("2tm", "2 Timóteo", New, 4),
    ("tt", "Tito", New, 3),
    ("fm", "Filemom", New, 1),
    ("hb", "Hebreus", New, 13),
    ("tg", "Tiago", New, 5),
    ("1pe", "1 Pedro", New, 5),
    ("2pe", "2 Pedro", New, 3),
    ("1jo", "1 João", New, 5),
    ("2jo", "2 João", New, 1),
    ("3jo", "3 João", New, 1),
    ("jd", "Judas", New, 1),
    ("ap", "Apocalipse", New, 22),
];

/// Abbreviations used by the source datasets, keyed in lowercase.
const ABBREVIATIONS: [(&str, &str); 67] = [
    ("gn", "gen"), ("ex", "exo"), ("lv", "lev"), ("nm", "num"), ("dt", "deu"), ("js", "jos"),
    ("jz", "jui"), ("rt", "rut"), ("1sm", "1sa"), ("2sm", "2sa"), ("1rs", "1rs"),
    ("2rs", "2rs"), ("1cr", "1cr"), ("2cr", "2cr"), ("ed", "edr"), ("ne", "nee"), ("et", "est"),
    ("jó", "job"), ("sl", "sl"), ("pv", "pv"), ("ec", "ec"), ("ct", "ct"), ("is", "is"),
    ("jr", "jr"), ("lm", "lm"), ("ez", "ez"), ("dn", "dn"), ("os", "os"), ("jl", "jl"),
    ("am", "am"), ("ob", "ob"), ("jn", "jn"), ("mq", "mq"), ("na", "na"), ("hc", "hc"),
    ("sf", "sf"), ("ag", "ag"), ("zc", "zc"), ("ml", "ml"), ("mt", "mt"), ("mc", "mc"),
    ("lc", "lc"), ("jo", "jo"), ("at", "at"), ("atos", "at"), ("rm", "rm"), ("1co", "1co"),
    ("2co", "2co"), ("gl", "gl"), ("ef", "ef"), ("fp", "fp"), ("cl", "cl"), ("1ts", "1ts"),
    ("2ts", "2ts"), ("1tm", "1tm"), ("2tm", "2tm"), ("tt", "tt"), ("fm", "fm"), ("hb", "hb"),
    ("tg", "tg"), ("1pe", "1pe"), ("2pe", "2pe"), ("1jo", "1jo"), ("2jo", "2jo"),
    ("3jo", "3jo"), ("jd", "jd"), ("ap", "ap"),
];

lazy_static! {
    static ref BY_ABBREVIATION: HashMap<&'static str, &'static str> =
        ABBREVIATIONS.iter().copied().collect();
}

/// Maps a dataset abbreviation to its canonical book id. The lookup is
/// case-insensitive; the raw form is tried when lowercasing changes it.
pub fn book_id_for(abbrev: &str) -> Option<&'static str> {
    let lowered = abbrev.trim().to_lowercase();
    BY_ABBREVIATION
        .get(lowered.as_str())
        .or_else(|| BY_ABBREVIATION.get(abbrev))
        .copied()
}

/// All canonical books as rows ready to insert.
pub fn books() -> Vec<Book> {
    BOOKS
        .iter()
        .enumerate()
        .map(|(i, (id, name, testament, chapters))| Book {
            id: id.to_string(),
            name: name.to_string(),
            testament: *testament,
            chapters: *chapters,
            canonical_order: i as i32 + 1,
        })
        .collect()
}
