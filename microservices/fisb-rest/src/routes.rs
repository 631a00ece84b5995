//! Route table
//!
//! Every public query path is one row here. The router registers each row and
//! hands matching requests to a single dispatch function, so adding a product
//! means adding a row.

use fisb_docstore::Filter;

/// Which executor operation serves a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    One,
    Many,
    StaticOne,
}

/// Fixed part of a route's filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    Is(&'static str, &'static str),
    IsInt(&'static str, i64),
    In(&'static str, &'static [&'static str]),
    Exists(&'static str),
}

/// How a path identifier is rewritten before it is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRule {
    Upper,
    HyphenToUnderscore,
    Verbatim,
}

impl IdRule {
    pub fn apply(self, id: &str) -> String {
        match self {
            IdRule::Upper => id.to_uppercase(),
            IdRule::HyphenToUnderscore => id.replace('-', "_"),
            IdRule::Verbatim => id.to_string(),
        }
    }
}

/// The `/{id}` form of a route
#[derive(Debug, Clone, Copy)]
pub struct Keyed {
    pub field: &'static str,
    pub rule: IdRule,
    pub dispatch: Dispatch,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    /// Aliases share the same filter and dispatch
    pub paths: &'static [&'static str],
    pub dispatch: Dispatch,
    pub criteria: &'static [Criterion],
    pub keyed: Option<Keyed>,
}

impl RouteSpec {
    /// Filter for a request, with the identifier from `/{id}` when present
    pub fn filter(&self, id: Option<&str>) -> Filter {
        let mut filter = self.criteria.iter().fold(Filter::new(), |f, c| match *c {
            Criterion::Is(field, value) => f.eq(field, value),
            Criterion::IsInt(field, value) => f.eq(field, value),
            Criterion::In(field, values) => f.one_of(field, values.iter().copied()),
            Criterion::Exists(field) => f.exists(field),
        });

        if let (Some(id), Some(keyed)) = (id, self.keyed) {
            filter = filter.eq(keyed.field, keyed.rule.apply(id));
        }
        filter
    }

    /// Dispatch for the bare or keyed form
    pub fn dispatch_for(&self, keyed: bool) -> Dispatch {
        match (keyed, self.keyed) {
            (true, Some(k)) => k.dispatch,
            _ => self.dispatch,
        }
    }
}

const fn many(paths: &'static [&'static str], criteria: &'static [Criterion]) -> RouteSpec {
    RouteSpec {
        paths,
        dispatch: Dispatch::Many,
        criteria,
        keyed: None,
    }
}

const fn keyed(
    paths: &'static [&'static str],
    criteria: &'static [Criterion],
    field: &'static str,
    rule: IdRule,
    dispatch: Dispatch,
) -> RouteSpec {
    RouteSpec {
        paths,
        dispatch: Dispatch::Many,
        criteria,
        keyed: Some(Keyed {
            field,
            rule,
            dispatch,
        }),
    }
}

const fn by_name(paths: &'static [&'static str], criteria: &'static [Criterion]) -> RouteSpec {
    keyed(paths, criteria, "unique_name", IdRule::Upper, Dispatch::One)
}

const fn by_location(paths: &'static [&'static str], criteria: &'static [Criterion]) -> RouteSpec {
    keyed(paths, criteria, "location", IdRule::Upper, Dispatch::Many)
}

const fn by_station(paths: &'static [&'static str], criteria: &'static [Criterion]) -> RouteSpec {
    keyed(paths, criteria, "station", IdRule::Verbatim, Dispatch::One)
}

use Criterion::{Exists, In, Is, IsInt};

pub const CANCELLABLE_TYPES: &[&str] = &["AIRMET", "SIGMET", "CWA", "G_AIRMET", "NOTAM"];

pub static ROUTES: &[RouteSpec] = &[
    many(&["/all"], &[]),
    by_name(&["/metar"], &[Is("type", "METAR")]),
    by_name(&["/taf"], &[Is("type", "TAF")]),
    many(&["/pirep"], &[Is("type", "PIREP")]),
    by_name(&["/wind-06"], &[Is("type", "WINDS_06_HR")]),
    by_name(&["/wind-12"], &[Is("type", "WINDS_12_HR")]),
    by_name(&["/wind-24"], &[Is("type", "WINDS_24_HR")]),
    many(&["/sigmet"], &[Is("type", "SIGMET")]),
    many(&["/airmet"], &[Is("type", "AIRMET")]),
    many(&["/cwa"], &[Is("type", "CWA")]),
    RouteSpec {
        paths: &["/rsr"],
        dispatch: Dispatch::One,
        criteria: &[Is("type", "RSR")],
        keyed: None,
    },
    many(&["/service-status"], &[Is("type", "SERVICE_STATUS")]),
    many(&["/g-airmet"], &[Is("type", "G_AIRMET")]),
    many(&["/g-airmet-00"], &[Is("type", "G_AIRMET"), IsInt("subtype", 0)]),
    many(&["/g-airmet-03"], &[Is("type", "G_AIRMET"), IsInt("subtype", 3)]),
    many(&["/g-airmet-06"], &[Is("type", "G_AIRMET"), IsInt("subtype", 6)]),
    many(&["/fis-b-unavailable"], &[Is("type", "FIS_B_UNAVAILABLE")]),
    by_location(&["/notam"], &[Is("type", "NOTAM")]),
    many(&["/notam-tfr"], &[Is("type", "NOTAM"), Is("subtype", "TFR")]),
    by_location(&["/notam-d"], &[Is("type", "NOTAM"), Is("subtype", "D")]),
    by_location(&["/notam-d-sua"], &[Is("type", "NOTAM"), Is("subtype", "D-SUA")]),
    by_location(&["/notam-fdc"], &[Is("type", "NOTAM"), Is("subtype", "FDC")]),
    by_location(&["/notam-tmoa"], &[Is("type", "NOTAM"), Is("subtype", "TMOA")]),
    by_location(&["/notam-tra"], &[Is("type", "NOTAM"), Is("subtype", "TRA")]),
    many(&["/cancel-notam"], &[Is("type", "NOTAM"), Exists("cancel")]),
    many(&["/cancel-g-airmet"], &[Is("type", "G_AIRMET"), Exists("cancel")]),
    many(&["/cancel-cwa"], &[Is("type", "CWA"), Exists("cancel")]),
    many(&["/cancel-sigmet"], &[Is("type", "SIGMET"), Exists("cancel")]),
    many(&["/cancel-airmet"], &[Is("type", "AIRMET"), Exists("cancel")]),
    many(&["/cancel"], &[In("type", CANCELLABLE_TYPES), Exists("cancel")]),
    by_station(&["/crl-8", "/crl-notam-tfr"], &[Is("type", "CRL_8")]),
    by_station(&["/crl-11", "/crl-airmet"], &[Is("type", "CRL_11")]),
    by_station(&["/crl-12", "/crl-sigmet"], &[Is("type", "CRL_12")]),
    by_station(&["/crl-14", "/crl-g-airmet"], &[Is("type", "CRL_14")]),
    by_station(&["/crl-15", "/crl-cwa"], &[Is("type", "CRL_15")]),
    by_station(&["/crl-16", "/crl-notam-tra"], &[Is("type", "CRL_16")]),
    by_station(&["/crl-17", "/crl-notam-tmoa"], &[Is("type", "CRL_17")]),
    many(&["/sua"], &[Is("type", "SUA")]),
    keyed(
        &["/image"],
        &[Is("type", "IMAGE")],
        "unique_name",
        IdRule::HyphenToUnderscore,
        Dispatch::Many,
    ),
    RouteSpec {
        paths: &["/static/legend"],
        dispatch: Dispatch::StaticOne,
        criteria: &[Is("_id", "LEGEND")],
        keyed: None,
    },
];

/// Look up the row serving `path` (bare form)
pub fn find_route(path: &str) -> Option<&'static RouteSpec> {
    ROUTES.iter().find(|r| r.paths.contains(&path))
}
