use serde_json::{Map, Value};

use super::{DatasetKind, Geometry};
use crate::normalize::{fields, NormalizedRow};

/// Common view of a stored record used by queries, statistics and export
pub trait SpatialRecord: Clone + Send + Sync + 'static {
    const KIND: DatasetKind;

    /// Resolved geometry, `None` when the source row had none usable
    fn geometry(&self) -> Option<&Geometry>;

    /// Neighborhood name as uploaded
    fn neighborhood(&self) -> Option<&str>;

    /// Exported properties: canonical fields with absent values omitted,
    /// followed by the extra columns that do not collide with them
    fn properties(&self) -> Map<String, Value>;
}

/// A land parcel ("lote")
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parcel {
    pub code: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    /// Land area in m²
    pub land_area: Option<f64>,
    /// Floor-area ratio ("ca")
    pub floor_area_ratio: Option<f64>,
    /// Coverage ratio ("to")
    pub coverage_ratio: Option<f64>,
    pub height_limit: Option<f64>,
    pub zoning_code: Option<String>,
    pub geometry: Option<Geometry>,
    pub extras: Map<String, Value>,
}

impl Parcel {
    pub fn from_row(row: &NormalizedRow, geometry: Option<Geometry>) -> Self {
        Self {
            code: row.text(fields::COD_LOTE),
            neighborhood: row.text(fields::BAIRRO),
            street: row.text(fields::LOGRADOURO),
            number: row.text(fields::NUMERO),
            land_area: row.non_negative(fields::AREA_TERRENO),
            floor_area_ratio: row.non_negative(fields::CA),
            coverage_ratio: row.non_negative(fields::TO),
            height_limit: row.non_negative(fields::LIMITE_ALTURA),
            zoning_code: row.text(fields::SIGLA_TRAT),
            geometry,
            extras: row.extras.clone(),
        }
    }
}

impl SpatialRecord for Parcel {
    const KIND: DatasetKind = DatasetKind::Lotes;

    fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    fn neighborhood(&self) -> Option<&str> {
        self.neighborhood.as_deref()
    }

    fn properties(&self) -> Map<String, Value> {
        let mut props = PropertyBuilder::default();
        props.text(fields::COD_LOTE, &self.code);
        props.text(fields::BAIRRO, &self.neighborhood);
        props.text(fields::LOGRADOURO, &self.street);
        props.text(fields::NUMERO, &self.number);
        props.number(fields::AREA_TERRENO, self.land_area);
        props.number(fields::CA, self.floor_area_ratio);
        props.number(fields::TO, self.coverage_ratio);
        props.number(fields::LIMITE_ALTURA, self.height_limit);
        props.text(fields::SIGLA_TRAT, &self.zoning_code);
        props.finish(&self.extras)
    }
}

/// A real-estate listing ("imóvel")
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    /// Development name ("empreendimento")
    pub name: Option<String>,
    pub developer: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub bedrooms: Option<u32>,
    /// Private area in m²
    pub private_area: Option<f64>,
    pub parking_spaces: Option<u32>,
    pub total_price: Option<f64>,
    pub status: Option<String>,
    pub units_total: Option<u32>,
    pub units_sold: Option<u32>,
    pub units_in_stock: Option<u32>,
    pub geometry: Option<Geometry>,
    pub extras: Map<String, Value>,
}

impl Listing {
    pub fn from_row(row: &NormalizedRow, geometry: Option<Geometry>) -> Self {
        Self {
            name: row.text(fields::EMPREENDIMENTO),
            developer: row.text(fields::INCORPORADOR),
            neighborhood: row.text(fields::BAIRRO),
            address: row.text(fields::ENDERECO),
            city: row.text(fields::CIDADE),
            bedrooms: row.count(fields::DORMITORIOS),
            private_area: row.non_negative(fields::METRAGEM_PRIVATIVA),
            parking_spaces: row.count(fields::VAGAS),
            total_price: row.amount(fields::PRECO_TOTAL),
            status: row.text(fields::STATUS),
            units_total: row.count(fields::UNIDADES_TOTAL),
            units_sold: row.count(fields::UNIDADES_VENDIDAS),
            units_in_stock: row.count(fields::ESTOQUE_ATUAL),
            geometry,
            extras: row.extras.clone(),
        }
    }
}

impl SpatialRecord for Listing {
    const KIND: DatasetKind = DatasetKind::Imoveis;

    fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    fn neighborhood(&self) -> Option<&str> {
        self.neighborhood.as_deref()
    }

    fn properties(&self) -> Map<String, Value> {
        let mut props = PropertyBuilder::default();
        props.text(fields::EMPREENDIMENTO, &self.name);
        props.text(fields::INCORPORADOR, &self.developer);
        props.text(fields::BAIRRO, &self.neighborhood);
        props.text(fields::ENDERECO, &self.address);
        props.text(fields::CIDADE, &self.city);
        props.count(fields::DORMITORIOS, self.bedrooms);
        props.number(fields::METRAGEM_PRIVATIVA, self.private_area);
        props.count(fields::VAGAS, self.parking_spaces);
        props.number(fields::PRECO_TOTAL, self.total_price);
        props.text(fields::STATUS, &self.status);
        props.count(fields::UNIDADES_TOTAL, self.units_total);
        props.count(fields::UNIDADES_VENDIDAS, self.units_sold);
        props.count(fields::ESTOQUE_ATUAL, self.units_in_stock);
        if let Some(Geometry::Point { coordinates: [lng, lat] }) = &self.geometry {
            props.number(fields::LATITUDE, Some(*lat));
            props.number(fields::LONGITUDE, Some(*lng));
        }
        props.finish(&self.extras)
    }
}

#[derive(Default)]
struct PropertyBuilder {
    map: Map<String, Value>,
}

impl PropertyBuilder {
    fn text(&mut self, key: &str, value: &Option<String>) {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::String(v.clone()));
        }
    }

    fn number(&mut self, key: &str, value: Option<f64>) {
        if let Some(v) = value.and_then(serde_json::Number::from_f64) {
            self.map.insert(key.to_string(), Value::Number(v));
        }
    }

    fn count(&mut self, key: &str, value: Option<u32>) {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::from(v));
        }
    }

    fn finish(mut self, extras: &Map<String, Value>) -> Map<String, Value> {
        for (key, value) in extras {
            if !self.map.contains_key(key) {
                self.map.insert(key.clone(), value.clone());
            }
        }
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)], extras: &[(&str, Value)]) -> NormalizedRow {
        let mut row = NormalizedRow::new(0);
        for (k, v) in pairs {
            row.insert(k, v.clone());
        }
        for (k, v) in extras {
            row.extras.insert(k.to_string(), v.clone());
        }
        row
    }

    #[test]
    fn test_parcel_from_row() {
        let row = row(
            &[
                ("codLote", json!("101")),
                ("bairro", json!("Centro")),
                ("area_terreno", json!("1.250,5")),
                ("ca", json!(2.5)),
            ],
            &[("inscricaoImobiliaria", json!("0123"))],
        );

        let parcel = Parcel::from_row(&row, None);
        assert_eq!(parcel.code.as_deref(), Some("101"));
        assert_eq!(parcel.land_area, Some(1250.5));
        assert_eq!(parcel.floor_area_ratio, Some(2.5));
        assert_eq!(parcel.coverage_ratio, None);

        let props = parcel.properties();
        assert_eq!(props["area_terreno"], json!(1250.5));
        assert_eq!(props["inscricaoImobiliaria"], json!("0123"));
        assert!(!props.contains_key("to"));
        assert_eq!(props.keys().next().map(String::as_str), Some("codLote"));
    }

    #[test]
    fn test_negative_price_is_absent() {
        let row = row(&[("empreendimento", json!("Ed. Mar")), ("preco_total", json!(-1))], &[]);
        let listing = Listing::from_row(&row, Some(Geometry::point(-40.3, -20.3)));

        assert_eq!(listing.total_price, None);
        assert!(!listing.properties().contains_key("preco_total"));
        assert!(listing.geometry().is_some());
    }

    #[test]
    fn test_listing_price_with_thousands_dot() {
        let row = row(
            &[("preco_total", json!("300.000")), ("metragem_privativa", json!("85.5"))],
            &[],
        );
        let listing = Listing::from_row(&row, None);

        assert_eq!(listing.total_price, Some(300000.0));
        assert_eq!(listing.private_area, Some(85.5));
    }

    #[test]
    fn test_listing_point_exports_coordinates() {
        let row = row(&[("empreendimento", json!("Ed. Mar"))], &[]);
        let listing = Listing::from_row(&row, Some(Geometry::point(-40.31, -20.31)));

        let props = listing.properties();
        assert_eq!(props["latitude"], json!(-20.31));
        assert_eq!(props["longitude"], json!(-40.31));

        let unplaced = Listing::from_row(&row, None);
        assert!(!unplaced.properties().contains_key("latitude"));
    }

    #[test]
    fn test_canonical_keys_win_over_extras() {
        let row = row(
            &[("bairro", json!("Centro"))],
            &[("bairro", json!("other")), ("x1", json!(1))],
        );
        let listing = Listing::from_row(&row, None);

        let props = listing.properties();
        assert_eq!(props["bairro"], json!("Centro"));
        assert_eq!(props["x1"], json!(1));
    }
}
