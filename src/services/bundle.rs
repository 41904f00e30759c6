//! Inspection bundles
//!
//! A bundle is the ordered answer to one inspection request. Required
//! resources abort the bundle on failure, optional ones are dropped, and
//! markers carry facts derived during the inspection.

use serde::Serialize;

use crate::error::Result;
use crate::models::GenericResource;

/// Log output of one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerLog {
    pub container: String,
    pub log: String,
}

/// One entry of an [`InspectionBundle`]
#[derive(Debug, Clone, PartialEq)]
pub enum BundleEntry {
    Resource(GenericResource),
    PodLogs {
        pod: String,
        containers: Vec<ContainerLog>,
    },
    Marker {
        key: String,
        value: String,
    },
}

/// Ordered result of one inspection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionBundle {
    entries: Vec<BundleEntry>,
}

impl InspectionBundle {
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn resources(&self) -> impl Iterator<Item = &GenericResource> {
        self.entries.iter().filter_map(|entry| match entry {
            BundleEntry::Resource(resource) => Some(resource),
            _ => None,
        })
    }

    /// Value of a marker, if present
    pub fn marker(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            BundleEntry::Marker { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incremental bundle construction
#[derive(Debug, Default)]
pub struct BundleBuilder {
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(&mut self, resource: GenericResource) -> &mut Self {
        self.entries.push(BundleEntry::Resource(resource));
        self
    }

    pub fn resources(&mut self, resources: impl IntoIterator<Item = GenericResource>) -> &mut Self {
        self.entries
            .extend(resources.into_iter().map(BundleEntry::Resource));
        self
    }

    /// Add the outcome of a required fetch; a failure is returned to the caller
    pub fn required(&mut self, fetched: Result<GenericResource>) -> Result<&mut Self> {
        Ok(self.resource(fetched?))
    }

    /// Add the outcome of a best-effort fetch; a failure leaves no trace in the bundle
    pub fn optional<R>(&mut self, what: &str, fetched: Result<R>) -> &mut Self
    where
        R: IntoIterator<Item = GenericResource>,
    {
        match fetched {
            Ok(resources) => self.resources(resources),
            Err(e) => {
                tracing::debug!(what, error = %e, "Optional resource unavailable, skipping");
                self
            }
        }
    }

    pub fn marker(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push(BundleEntry::Marker {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn logs(&mut self, pod: impl Into<String>, containers: Vec<ContainerLog>) -> &mut Self {
        self.entries.push(BundleEntry::PodLogs {
            pod: pod.into(),
            containers,
        });
        self
    }

    pub fn build(self) -> InspectionBundle {
        InspectionBundle {
            entries: self.entries,
        }
    }
}

/// Assemble a bundle from already attempted fetches
///
/// Required resources come first in the given order, then whatever optional
/// fetches succeeded, then the markers.
pub fn build_bundle<I>(
    required: impl IntoIterator<Item = Result<GenericResource>>,
    optional: impl IntoIterator<Item = (String, Result<I>)>,
    markers: impl IntoIterator<Item = (String, String)>,
) -> Result<InspectionBundle>
where
    I: IntoIterator<Item = GenericResource>,
{
    let mut builder = BundleBuilder::new();
    for fetched in required {
        builder.required(fetched)?;
    }
    for (what, fetched) in optional {
        builder.optional(&what, fetched);
    }
    for (key, value) in markers {
        builder.marker(key, value);
    }
    Ok(builder.build())
}
