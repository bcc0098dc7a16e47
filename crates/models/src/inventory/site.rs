use serde::{Deserialize, Serialize};

use crate::inventory::Guid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub guid: Guid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Site {
    /// Coordinates formatted for display. Whole numbers keep their fractional
    /// part so `10.0` stays `10.0`.
    pub fn coordinates(&self) -> (String, String) {
        (format!("{:?}", self.latitude), format!("{:?}", self.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_keep_fraction() {
        let site = Site {
            guid: Guid::from("s-1"),
            name: "DC1".to_string(),
            latitude: 10.0,
            longitude: -73.25,
        };

        assert_eq!(site.coordinates(), ("10.0".to_string(), "-73.25".to_string()));
    }

    #[test]
    fn site_from_yaml() {
        let yaml = "guid: s-1\nname: DC1\nlatitude: 43.1\nlongitude: -70.9\n";
        let site: Site = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(site.name, "DC1");
        assert_eq!(site.latitude, 43.1);
    }
}
