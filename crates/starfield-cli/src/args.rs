use std::str::FromStr;

/// Manual connection supplied as `--connection <a>,<b>,<weight>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionArg {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

impl FromStr for ConnectionArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [from, to, weight] = parts.as_slice() else {
            return Err(format!(
                "expected <system>,<system>,<weight> but got '{value}'"
            ));
        };
        if from.is_empty() || to.is_empty() {
            return Err(format!("connection '{value}' is missing a system name"));
        }
        let weight = weight
            .parse::<f64>()
            .map_err(|err| format!("invalid weight '{weight}': {err}"))?;

        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        })
    }
}
