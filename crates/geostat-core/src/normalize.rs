//! Column canonicalization for uploaded tables
//!
//! Source files name the same field many ways ("Preco Total", "preco_total",
//! "precoTotal"). Column names are folded to a canonical spelling and looked
//! up in a per-kind alias table; columns that match nothing are kept as
//! extras and travel with the record untouched.

use serde_json::{Map, Value};

use crate::error::{GeostatError, Result};
use crate::formats::Table;
use crate::models::DatasetKind;

/// Canonical property keys
pub mod fields {
    // Parcels
    pub const COD_LOTE: &str = "codLote";
    pub const LOGRADOURO: &str = "logradouro";
    pub const NUMERO: &str = "numero";
    pub const AREA_TERRENO: &str = "area_terreno";
    pub const CA: &str = "ca";
    pub const TO: &str = "to";
    pub const LIMITE_ALTURA: &str = "limite_altura";
    pub const SIGLA_TRAT: &str = "sigla_trat";

    // Listings
    pub const EMPREENDIMENTO: &str = "empreendimento";
    pub const INCORPORADOR: &str = "incorporador";
    pub const ENDERECO: &str = "endereco";
    pub const CIDADE: &str = "cidade";
    pub const DORMITORIOS: &str = "dormitorios";
    pub const METRAGEM_PRIVATIVA: &str = "metragem_privativa";
    pub const VAGAS: &str = "vagas";
    pub const PRECO_TOTAL: &str = "preco_total";
    pub const STATUS: &str = "status";
    pub const UNIDADES_TOTAL: &str = "unidades_total";
    pub const UNIDADES_VENDIDAS: &str = "unidades_vendidas";
    pub const ESTOQUE_ATUAL: &str = "estoque_atual";

    // Shared
    pub const BAIRRO: &str = "bairro";

    // Geometry-bearing
    pub const GEOMETRY: &str = "geometry";
    pub const VERTICES: &str = "vertices";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
}

/// What a canonical field contributes to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Names or identifies the record
    Identifier,
    /// Carries coordinates or a geometry encoding
    Geometry,
    /// Any other typed attribute
    Attribute,
}

/// A canonical field and the folded column names that map onto it
#[derive(Debug)]
pub struct FieldSpec {
    pub key: &'static str,
    pub role: FieldRole,
    pub aliases: &'static [&'static str],
}

const fn spec(key: &'static str, role: FieldRole, aliases: &'static [&'static str]) -> FieldSpec {
    FieldSpec { key, role, aliases }
}

const BAIRRO_ALIASES: &[&str] =
    &["bairro", "nome_bairro", "bairro_nome", "neighborhood", "distrito"];
const GEOMETRY_ALIASES: &[&str] = &[
    "geometry", "geometria", "geom", "the_geom", "wkt", "geojson", "shape", "polygon", "poligono",
];
const VERTICES_ALIASES: &[&str] =
    &["vertices", "vertice", "coordenadas", "coordinates", "coords", "pontos"];

static PARCEL_FIELDS: &[FieldSpec] = &[
    spec(
        fields::COD_LOTE,
        FieldRole::Identifier,
        &["cod_lote", "codigo_lote", "cod", "codigo", "id", "id_lote", "lote"],
    ),
    spec(fields::BAIRRO, FieldRole::Attribute, BAIRRO_ALIASES),
    spec(
        fields::LOGRADOURO,
        FieldRole::Attribute,
        &["logradouro", "rua", "street", "nome_logradouro"],
    ),
    spec(fields::NUMERO, FieldRole::Attribute, &["numero", "num", "number", "nro"]),
    spec(
        fields::AREA_TERRENO,
        FieldRole::Attribute,
        &["area_terreno", "area", "area_lote", "area_m2", "area_do_terreno"],
    ),
    spec(
        fields::CA,
        FieldRole::Attribute,
        &["ca", "coeficiente_aproveitamento", "coef_aproveitamento"],
    ),
    spec(fields::TO, FieldRole::Attribute, &["to", "taxa_ocupacao", "taxa_de_ocupacao"]),
    spec(
        fields::LIMITE_ALTURA,
        FieldRole::Attribute,
        &["limite_altura", "altura_maxima", "max_height"],
    ),
    spec(fields::SIGLA_TRAT, FieldRole::Attribute, &["sigla_trat", "zona", "zoneamento", "zoning"]),
    spec(fields::GEOMETRY, FieldRole::Geometry, GEOMETRY_ALIASES),
    spec(fields::VERTICES, FieldRole::Geometry, VERTICES_ALIASES),
];

static LISTING_FIELDS: &[FieldSpec] = &[
    spec(
        fields::EMPREENDIMENTO,
        FieldRole::Identifier,
        &["empreendimento", "nome_empreendimento", "nome", "name", "id", "codigo"],
    ),
    spec(
        fields::INCORPORADOR,
        FieldRole::Attribute,
        &["incorporador", "incorporadora", "construtora", "developer"],
    ),
    spec(fields::BAIRRO, FieldRole::Attribute, BAIRRO_ALIASES),
    spec(fields::ENDERECO, FieldRole::Attribute, &["endereco", "address", "logradouro"]),
    spec(fields::CIDADE, FieldRole::Attribute, &["cidade", "municipio", "city"]),
    spec(
        fields::DORMITORIOS,
        FieldRole::Attribute,
        &["dormitorios", "dormitorio", "dorms", "quartos", "bedrooms"],
    ),
    spec(
        fields::METRAGEM_PRIVATIVA,
        FieldRole::Attribute,
        &["metragem_privativa", "area_privativa", "metragem", "area_util", "private_area"],
    ),
    spec(fields::VAGAS, FieldRole::Attribute, &["vagas", "vagas_garagem", "parking"]),
    spec(
        fields::PRECO_TOTAL,
        FieldRole::Attribute,
        &["preco_total", "preco", "valor", "valor_total", "price"],
    ),
    spec(fields::STATUS, FieldRole::Attribute, &["status", "situacao", "fase"]),
    spec(
        fields::UNIDADES_TOTAL,
        FieldRole::Attribute,
        &["unidades_total", "total_unidades", "unidades"],
    ),
    spec(fields::UNIDADES_VENDIDAS, FieldRole::Attribute, &["unidades_vendidas", "vendidas"]),
    spec(fields::ESTOQUE_ATUAL, FieldRole::Attribute, &["estoque_atual", "estoque"]),
    spec(fields::LATITUDE, FieldRole::Geometry, &["latitude", "lat", "y"]),
    spec(fields::LONGITUDE, FieldRole::Geometry, &["longitude", "lng", "lon", "long", "x"]),
    spec(fields::GEOMETRY, FieldRole::Geometry, GEOMETRY_ALIASES),
    spec(fields::VERTICES, FieldRole::Geometry, VERTICES_ALIASES),
];

/// Alias table for a dataset kind
pub fn field_specs(kind: DatasetKind) -> &'static [FieldSpec] {
    match kind {
        DatasetKind::Lotes => PARCEL_FIELDS,
        DatasetKind::Imoveis => LISTING_FIELDS,
    }
}

/// Find the canonical field a source column maps onto
pub fn resolve_column(kind: DatasetKind, column: &str) -> Option<&'static FieldSpec> {
    let folded = fold_column_name(column);
    field_specs(kind).iter().find(|spec| spec.aliases.contains(&folded.as_str()))
}

/// Fold a column name: split camel case, lowercase, strip diacritics and
/// turn every other separator into a single `_`
pub fn fold_column_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    let mut prev: Option<char> = None;

    for c in name.trim().chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            folded.push('_');
        }
        for lower in c.to_lowercase() {
            let base = strip_diacritic(lower);
            folded.push(if base.is_ascii_alphanumeric() { base } else { '_' });
        }
        prev = Some(c);
    }

    folded.split('_').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("_")
}

/// Fold free text for comparison: trimmed, lowercase, no diacritics,
/// single spaces
pub fn fold_text(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars().flat_map(char::to_lowercase).map(strip_diacritic).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// One source row split into canonical fields and opaque extras
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    /// Zero-based position in the uploaded table
    pub index: usize,
    fields: Map<String, Value>,
    /// Unrecognized columns under their original names
    pub extras: Map<String, Value>,
}

impl NormalizedRow {
    pub fn new(index: usize) -> Self {
        Self { index, ..Default::default() }
    }

    /// Set a canonical field, keeping an existing non-empty value
    pub fn insert(&mut self, key: &str, value: Value) {
        if !is_blank(&value) && !self.fields.contains_key(key) {
            self.fields.insert(key.to_string(), value);
        }
    }

    /// Raw value of a canonical field; blank values are never stored
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field as trimmed text; numbers and booleans are rendered
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Field as a finite number
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }

    /// Field as a finite, non-negative number
    pub fn non_negative(&self, key: &str) -> Option<f64> {
        self.number(key).filter(|v| *v >= 0.0)
    }

    /// Field as a non-negative monetary amount
    ///
    /// Unlike `number`, a lone dot followed by exactly three digits is read
    /// as a thousands separator (`"300.000"` is 300000).
    pub fn amount(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_amount).filter(|v| *v >= 0.0)
    }

    /// Field as a whole, non-negative count
    pub fn count(&self, key: &str) -> Option<u32> {
        self.non_negative(key)
            .filter(|v| v.fract() == 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32)
    }
}

/// An upload mapped onto the canonical field set of its kind
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub kind: DatasetKind,
    /// Canonical keys and extra column names, in source header order
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Map a decoded table onto the canonical fields of `kind`
///
/// Fails with a schema error when no column identifies records or carries
/// geometry.
pub fn normalize_table(kind: DatasetKind, table: Table) -> Result<NormalizedTable> {
    let mapping: Vec<Option<&'static FieldSpec>> =
        table.columns.iter().map(|column| resolve_column(kind, column)).collect();

    let usable = mapping
        .iter()
        .flatten()
        .any(|spec| matches!(spec.role, FieldRole::Identifier | FieldRole::Geometry));

    if !usable {
        return Err(GeostatError::Schema {
            kind,
            reason: if table.columns.is_empty() {
                "file contains no columns".to_string()
            } else {
                format!(
                    "no identifying or geometry column found among [{}]",
                    table.columns.join(", ")
                )
            },
        });
    }

    let mut columns: Vec<String> = Vec::with_capacity(table.columns.len());
    for (column, spec) in table.columns.iter().zip(&mapping) {
        let name = spec.map_or(column.as_str(), |s| s.key);
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }

    let rows = table
        .rows
        .into_iter()
        .enumerate()
        .map(|(index, values)| {
            let mut row = NormalizedRow::new(index);
            for ((column, spec), value) in table.columns.iter().zip(&mapping).zip(values) {
                match spec {
                    Some(spec) => row.insert(spec.key, value),
                    None => {
                        row.extras.insert(column.clone(), value);
                    }
                }
            }
            row
        })
        .collect();

    Ok(NormalizedTable { kind, columns, rows })
}

/// Parse a numeric cell
///
/// Accepts JSON numbers and strings in Brazilian or international notation,
/// with optional currency and area units. Non-finite results are rejected.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_str(s),
        _ => None,
    }
}

/// Parse a monetary cell; see [`NormalizedRow::amount`]
pub fn parse_amount(value: &Value) -> Option<f64> {
    if let Value::String(raw) = value {
        let s = strip_units(raw);
        if is_dot_grouped(&s) {
            return s.replace('.', "").parse::<f64>().ok();
        }
    }
    parse_number(value)
}

/// `1.234.567` style digits: groups of three after the first dot
fn is_dot_grouped(s: &str) -> bool {
    let mut groups = s.split('.');
    let head = groups.next().unwrap_or_default();
    let head = head.strip_prefix('-').unwrap_or(head);
    let mut tail = groups.peekable();

    tail.peek().is_some()
        && (1..=3).contains(&head.len())
        && head.bytes().all(|b| b.is_ascii_digit())
        && tail.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

fn strip_units(raw: &str) -> String {
    let mut s = raw.trim().to_lowercase();
    for unit in ["r$", "m²", "m2"] {
        s = s.replace(unit, "");
    }
    s.retain(|c| !c.is_whitespace());
    s
}

fn parse_number_str(raw: &str) -> Option<f64> {
    let s = strip_units(raw);
    if s.is_empty() {
        return None;
    }

    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => s,
        (0, _) => s.replace('.', ""),
        (1, 0) => s.replace(',', "."),
        (_, 0) => s.replace(',', ""),
        _ => {
            // Both separators: the last one is the decimal mark
            if s.rfind(',') > s.rfind('.') {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
