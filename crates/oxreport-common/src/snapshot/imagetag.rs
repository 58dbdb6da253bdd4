use chrono::{DateTime, Utc};
use oxreport_expr::{RecordBuilder, ToValue, Value};
use serde::{Deserialize, Serialize};

/// Container images referenced by deployments and statefulsets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub deployments: Vec<Resource>,
    #[serde(default)]
    pub statefulsets: Vec<Resource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Full reference, e.g. `docker.io/library/nginx:1.27`.
    pub name: String,
    #[serde(default)]
    pub from_init_container: bool,
}

impl ToValue for Metrics {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Timestamp", &self.timestamp)
            .field("Deployments", &self.deployments)
            .field("Statefulsets", &self.statefulsets)
            .build()
    }
}

impl ToValue for Resource {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("Namespace", &self.namespace)
            .field("Images", &self.images)
            .build()
    }
}

impl ToValue for Image {
    fn to_value(&self) -> Value {
        RecordBuilder::new()
            .field("Name", &self.name)
            .field("FromInitContainer", self.from_init_container)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxreport_expr::{compile, MessageTemplate};

    fn image(name: &str, init: bool) -> Image {
        Image {
            name: name.into(),
            from_init_container: init,
        }
    }

    fn metrics() -> Metrics {
        Metrics {
            timestamp: Utc::now(),
            deployments: vec![
                Resource {
                    name: "api".into(),
                    namespace: "prod".into(),
                    images: vec![image("busybox:latest", true), image("registry.local/api:2.4.1", false)],
                },
                Resource {
                    name: "web".into(),
                    namespace: "prod".into(),
                    images: vec![image("registry.local/web:1.0.0", false)],
                },
            ],
            statefulsets: Vec::new(),
        }
    }

    #[test]
    fn latest_tag_rule() {
        let snapshot = metrics().to_value();
        let latest = compile(
            "len(findManyRegex(findOne(Deployments, \"Name\", \"api\").Images, \"Name\", \":latest$\")) > 0",
        )
        .unwrap();
        assert!(latest.evaluate_bool(&snapshot).unwrap());

        let message = MessageTemplate::new(
            "init images of api: `findMany(findOne(Deployments, \"Name\", \"api\").Images, \"FromInitContainer\", true) -> \"Name\"`",
        )
        .render(&snapshot)
        .unwrap();
        assert_eq!(message, "init images of api: busybox:latest");
    }

    #[test]
    fn pinned_images_do_not_match() {
        let snapshot = metrics().to_value();
        let web = compile("findOne(Deployments, \"Name\", \"web\").Images | findOneRegex(@, \"Name\", \":latest$\")")
            .unwrap()
            .evaluate(&snapshot)
            .unwrap();
        assert!(web.is_null());
    }
}
