// Días de la semana y conjuntos de días como máscara de bits.
//
// La oferta académica mezcla abreviaturas ("LU", "MIE", "J", "Miércoles"...);
// todas se normalizan aquí a un enum cerrado de seis valores.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Abreviatura usada por la universidad
    pub fn abbrev(self) -> &'static str {
        match self {
            Weekday::Mon => "LU",
            Weekday::Tue => "MA",
            Weekday::Wed => "MI",
            Weekday::Thu => "JU",
            Weekday::Fri => "VI",
            Weekday::Sat => "SA",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1u8 << (self as u8)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'Á' => 'A',
            'é' | 'É' => 'E',
            'í' | 'Í' => 'I',
            'ó' | 'Ó' => 'O',
            'ú' | 'Ú' => 'U',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

impl FromStr for Weekday {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = fold_accents(s.trim().trim_end_matches('.'));
        let day = match token.as_str() {
            "LU" | "LUN" | "LUNES" | "L" | "MON" | "MONDAY" => Weekday::Mon,
            "MA" | "MAR" | "MARTES" | "M" | "TUE" | "TUESDAY" => Weekday::Tue,
            "MI" | "MIE" | "MIERCOLES" | "W" | "X" | "WED" | "WEDNESDAY" => Weekday::Wed,
            "JU" | "JUE" | "JUEVES" | "J" | "THU" | "THURSDAY" => Weekday::Thu,
            "VI" | "VIE" | "VIERNES" | "V" | "FRI" | "FRIDAY" => Weekday::Fri,
            "SA" | "SAB" | "SABADO" | "S" | "SAT" | "SATURDAY" => Weekday::Sat,
            _ => return Err(ScheduleError::InvalidWeekday(s.to_string())),
        };
        Ok(day)
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbrev())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Conjunto de días codificado en los 6 bits bajos de un `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DaySet(u8);

impl DaySet {
    pub const fn empty() -> Self {
        DaySet(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day.bit();
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    #[inline]
    pub fn intersects(self, other: DaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn intersection(self, other: DaySet) -> DaySet {
        DaySet(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::empty();
        for d in iter {
            set.insert(d);
        }
        set
    }
}

impl From<Vec<Weekday>> for DaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<DaySet> for Vec<Weekday> {
    fn from(set: DaySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Weekday::abbrev).collect();
        f.write_str(&names.join(" "))
    }
}
