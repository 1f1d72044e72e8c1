//! Shared fixtures for ingest integration tests.
//!
//! Fakes the remote side only: feed payloads are served by `MockFetcher`,
//! everything else runs the real pipeline.
#![allow(dead_code)]

use feedwatch_common::{Config, Record};
use feedwatch_ingest::testing::MockFetcher;
use serde_json::{json, Value};

pub const GDACS_URL: &str = "https://gdacs.test/xml/rss.xml";
pub const HAZARD_TYPES_URL: &str = "https://hazards.test/IDMC_Hazard_Types_Translator.csv";
pub const ACLED_URL: &str = "https://acled.test/acled/read?terms=accept";

/// Aisne, France. Geohash at precision 9 is `u0fe1q81v`.
pub const AISNE: (f64, f64) = (49.7821, 3.5708);
/// Lima, Peru.
pub const LIMA: (f64, f64) = (-12.0464, -77.0428);

pub fn config() -> Config {
    Config {
        gdacs_url: GDACS_URL.to_string(),
        hazard_types_url: HAZARD_TYPES_URL.to_string(),
        acled_url: ACLED_URL.to_string(),
        acled_max_pages: 10,
        ..Config::default()
    }
}

// ---------------------------------------------------------------------------
// GDACS
// ---------------------------------------------------------------------------

/// One GDACS alert with every field the key transforms expect.
pub struct GdacsItem<'a> {
    pub event_id: &'a str,
    pub event_type: &'a str,
    pub pub_date: &'a str,
    pub country: &'a str,
    pub coords: (f64, f64),
    pub description: &'a str,
}

impl GdacsItem<'_> {
    pub fn geojson_url(&self) -> String {
        format!(
            "https://gdacs.test/datareport/resources/{}/{}/geojson_{}_1.geojson",
            self.event_type, self.event_id, self.event_id
        )
    }

    pub fn to_xml(&self) -> String {
        let GdacsItem {
            event_id: id,
            event_type: et,
            pub_date,
            country,
            coords: (lat, lng),
            description,
        } = self;
        let geojson = self.geojson_url();
        format!(
            r#"<item>
      <title>Green alert in {country}</title>
      <description>{description}</description>
      <link>https://gdacs.test/report.aspx?eventid={id}</link>
      <pubDate>{pub_date}</pubDate>
      <guid isPermaLink="false">{et}{id}</guid>
      <geo:Point><geo:lat>{lat}</geo:lat><geo:long>{lng}</geo:long></geo:Point>
      <gdacs:alertlevel>Green</gdacs:alertlevel>
      <gdacs:cap>https://gdacs.test/contentdata/resources/{et}/{id}/cap_{id}.xml</gdacs:cap>
      <gdacs:country>{country}</gdacs:country>
      <gdacs:episodeid>1</gdacs:episodeid>
      <gdacs:eventid>{id}</gdacs:eventid>
      <gdacs:eventname></gdacs:eventname>
      <gdacs:eventtype>{et}</gdacs:eventtype>
      <gdacs:fromdate>{pub_date}</gdacs:fromdate>
      <gdacs:glide></gdacs:glide>
      <gdacs:gtslink>https://gdacs.test/gts/{id}</gdacs:gtslink>
      <gdacs:population value="0" unit="">0 people affected</gdacs:population>
      <gdacs:resources><gdacs:resource id="overview" url="https://gdacs.test/report.aspx?eventid={id}" type="html"><gdacs:title>Report</gdacs:title></gdacs:resource><gdacs:resource id="shape" url="{geojson}" type="geojson"><gdacs:title>Shape</gdacs:title></gdacs:resource></gdacs:resources>
      <gdacs:severity unit="M" value="4.8">Magnitude 4.8M, Depth:10km</gdacs:severity>
      <gdacs:todate>{pub_date}</gdacs:todate>
      <gdacs:version>1</gdacs:version>
      <gdacs:vulnerability value="0.5"/>
      <gdacs:year>2020</gdacs:year>
    </item>"#
        )
    }
}

pub fn gdacs_feed(items: &[GdacsItem<'_>]) -> String {
    let items: String = items.iter().map(GdacsItem::to_xml).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:gdacs="http://www.gdacs.org" xmlns:geo="http://www.w3.org/2003/01/geo/wgs84_pos#">
  <channel>
    <title>GDACS RSS information</title>
    <link>https://gdacs.test/</link>
    <!-- last 7 days -->
    {items}
  </channel>
</rss>"#
    )
}

pub fn aisne_earthquake() -> GdacsItem<'static> {
    GdacsItem {
        event_id: "1000001",
        event_type: "EQ",
        pub_date: "Wed, 01 Jan 2020 10:00:00 GMT",
        country: "France",
        coords: AISNE,
        description: "Several houses destroyed near the epicentre.",
    }
}

pub fn lima_flood() -> GdacsItem<'static> {
    GdacsItem {
        event_id: "1000002",
        event_type: "FL",
        pub_date: "Thu, 02 Jan 2020 08:30:00 GMT",
        country: "Peru",
        coords: LIMA,
        description: "Heavy rainfall along the coast.",
    }
}

pub fn drought() -> GdacsItem<'static> {
    GdacsItem {
        event_id: "1000003",
        event_type: "DR",
        pub_date: "Sun, 05 Jan 2020 00:00:00 GMT",
        country: "Peru",
        coords: LIMA,
        description: "Rainfall deficit.",
    }
}

pub const GEOJSON_BODY: &str = r#"{"type":"FeatureCollection","features":[]}"#;

/// Fetcher serving the standard GDACS feed: the Aisne earthquake twice, the
/// Lima flood and a drought. Only the earthquake's shape file resolves.
pub fn gdacs_fetcher() -> MockFetcher {
    let feed = gdacs_feed(&[aisne_earthquake(), lima_flood(), aisne_earthquake(), drought()]);
    MockFetcher::new()
        .on(GDACS_URL, feed)
        .on(&aisne_earthquake().geojson_url(), GEOJSON_BODY)
        .on(HAZARD_TYPES_URL, HAZARD_CSV)
}

// ---------------------------------------------------------------------------
// Hazard monitoring
// ---------------------------------------------------------------------------

pub const HAZARD_CSV: &str = "\
GDACS_eventtype,IDMC_id,IDMC_type
EQ,1,Earthquake
FL,5,Flood
TC,7,Storm
";

/// A box around northern France and a box around Lima.
pub const BORDERS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"ISO3": "FRA", "NAME": "France"},
            "geometry": {"type": "Polygon", "coordinates": [[[0,45],[8,45],[8,51],[0,51],[0,45]]]}
        },
        {
            "type": "Feature",
            "properties": {"ISO3": "BEL", "NAME": "Belgium"},
            "geometry": {"type": "Polygon", "coordinates": [[[2.5,50],[6.4,50],[6.4,51.5],[2.5,51.5],[2.5,50]]]}
        }
    ]
}"#;

// ---------------------------------------------------------------------------
// ACLED
// ---------------------------------------------------------------------------

pub fn acled_page_url(page: u32) -> String {
    format!("{ACLED_URL}&page={page}")
}

pub fn acled_event(data_id: &str, event_date: &str, coords: (f64, f64)) -> Value {
    json!({
        "data_id": data_id,
        "event_id_cnty": format!("MLI{data_id}"),
        "event_date": event_date,
        "year": "2020",
        "event_type": "Violence against civilians",
        "actor1": "Unidentified Armed Group (Mali)",
        "assoc_actor_1": "",
        "actor2": "Civilians (Mali)",
        "assoc_actor_2": "Fulani Ethnic Group (Mali)",
        "country": "Mali",
        "latitude": coords.0.to_string(),
        "longitude": coords.1.to_string(),
        "fatalities": "2",
    })
}

pub fn acled_page(events: &[Value]) -> String {
    json!({
        "status": 200,
        "success": true,
        "count": events.len(),
        "data": events,
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from(map),
        _ => panic!("test record must be an object"),
    }
}

pub fn find<'a>(records: &'a [Record], field: &str, value: &str) -> &'a Record {
    records
        .iter()
        .find(|r| r.get_str(field) == Some(value))
        .unwrap_or_else(|| panic!("no record with {field} = {value}"))
}
