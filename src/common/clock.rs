// src/common/clock.rs

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Data de "hoje" da aplicação. Toda regra de "hoje" (data do relatório,
/// dashboard, períodos padrão) parte daqui, nunca do `CURRENT_DATE` do banco.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Intervalo semiaberto `[início de from, início de to + 1)` em UTC, para
/// filtrar colunas `timestamptz` pelos dias locais.
pub fn local_day_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(&Local, from, to)
}

pub fn day_bounds<Tz: TimeZone>(tz: &Tz, from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = to.checked_add_days(Days::new(1)).unwrap_or(to);
    (start_of_day(tz, from), start_of_day(tz, end))
}

// Em dia com horário de verão a meia-noite pode não existir; vale o primeiro instante válido.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + chrono::Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bounds_follow_the_local_offset() {
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();
        let day = date(2025, 3, 10);

        let (start, end) = day_bounds(&sao_paulo, day, day);

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 11, 3, 0, 0).unwrap());
    }

    #[test]
    fn evening_instant_belongs_to_the_local_day() {
        // 22h em São Paulo já é o dia seguinte em UTC
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 3, 11, 1, 0, 0).unwrap();

        let (start, end) = day_bounds(&sao_paulo, date(2025, 3, 10), date(2025, 3, 10));

        assert!(start <= evening && evening < end);
    }

    #[test]
    fn range_covers_whole_last_day() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let (start, end) = day_bounds(&utc, date(2025, 2, 24), date(2025, 3, 2));

        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 24, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap());
    }
}
