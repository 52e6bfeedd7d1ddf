//! Report definitions. `{table}` is replaced with the configured table name.
//!
//! Every ORDER BY ends with the grouping keys so repeated runs return rows in
//! the same order. Hours come from the text before the first `:` of
//! `stop_time`, so `9:05:00` and `09:05:00` both land in hour 9.

use super::QueryTemplate;

pub(super) const ADVANCED: &[QueryTemplate] = &[
    QueryTemplate {
        id: "top_drug_vehicles",
        label: "What are the top 10 vehicle_Number involved in drug-related stops",
        sql: r#"
SELECT vehicle_number, COUNT(*) AS stop_count
FROM {table}
WHERE drugs_related_stop = 1
GROUP BY vehicle_number
ORDER BY stop_count DESC, vehicle_number
LIMIT 10
"#,
        columns: &["vehicle_number", "stop_count"],
    },
    QueryTemplate {
        id: "most_searched_vehicles",
        label: "Which vehicles were most frequently searched",
        sql: r#"
SELECT vehicle_number, COUNT(*) AS search_count
FROM {table}
WHERE search_conducted = 1
GROUP BY vehicle_number
ORDER BY search_count DESC, vehicle_number
"#,
        columns: &["vehicle_number", "search_count"],
    },
    QueryTemplate {
        id: "arrest_rate_by_age",
        label: "Which driver age group had the highest arrest rate",
        sql: r#"
SELECT driver_age,
    COUNT(CASE WHEN stop_outcome = 'Arrest' THEN 1 END) * 100.0 / COUNT(*) AS is_arrested
FROM {table}
GROUP BY driver_age
ORDER BY 2 DESC, driver_age
"#,
        columns: &["driver_age", "is_arrested"],
    },
    QueryTemplate {
        id: "gender_by_country",
        label: "What is the gender distribution of drivers stopped in each country",
        sql: r#"
SELECT country_name, driver_gender, COUNT(*) AS stop_count
FROM {table}
GROUP BY country_name, driver_gender
ORDER BY country_name, stop_count DESC, driver_gender
"#,
        columns: &["country_name", "driver_gender", "stop_count"],
    },
    QueryTemplate {
        id: "search_rate_by_race_gender",
        label: "Which race and gender combination has the highest search rate",
        sql: r#"
SELECT driver_race, driver_gender,
    COUNT(CASE WHEN search_conducted = 1 THEN 1 END) * 100.0 / COUNT(*) AS search_rate
FROM {table}
GROUP BY driver_race, driver_gender
ORDER BY search_rate DESC, driver_race, driver_gender
"#,
        columns: &["driver_race", "driver_gender", "search_rate"],
    },
    QueryTemplate {
        id: "stops_by_hour",
        label: "What time of day sees the most traffic stops",
        sql: r#"
SELECT CAST(CASE
        WHEN instr(stop_time, ':') > 0 THEN substr(stop_time, 1, instr(stop_time, ':') - 1)
        ELSE stop_time
    END AS INTEGER) AS hour,
    COUNT(*) AS stop_count
FROM {table}
GROUP BY hour
ORDER BY stop_count DESC, hour
"#,
        columns: &["hour", "stop_count"],
    },
    QueryTemplate {
        id: "avg_duration_by_violation",
        label: "What is the average stop duration for different violations",
        sql: r#"
SELECT violation, AVG(CAST(stop_duration AS REAL)) AS avg_duration
FROM {table}
GROUP BY violation
ORDER BY avg_duration DESC, violation
"#,
        columns: &["violation", "avg_duration"],
    },
    QueryTemplate {
        id: "night_arrest_rate",
        label: "Are stops during the night more likely to lead to arrests",
        sql: r#"
SELECT CASE
        WHEN hour BETWEEN 20 AND 23 OR hour BETWEEN 0 AND 5 THEN 'Night'
        ELSE 'Day'
    END AS time_of_day,
    COUNT(CASE WHEN stop_outcome = 'Arrest' THEN 1 END) * 100.0 / COUNT(*) AS arrest_rate
FROM (
    SELECT stop_outcome,
        CAST(CASE
            WHEN instr(stop_time, ':') > 0 THEN substr(stop_time, 1, instr(stop_time, ':') - 1)
            ELSE stop_time
        END AS INTEGER) AS hour
    FROM {table}
) t
GROUP BY time_of_day
ORDER BY time_of_day
"#,
        columns: &["time_of_day", "arrest_rate"],
    },
    QueryTemplate {
        id: "violation_search_arrest_counts",
        label: "Which violations are most associated with searches or arrests",
        sql: r#"
SELECT violation,
    COUNT(CASE WHEN search_conducted = 1 THEN 1 END) AS search_count,
    COUNT(CASE WHEN is_arrested = 1 THEN 1 END) AS arrest_count
FROM {table}
GROUP BY violation
ORDER BY COUNT(CASE WHEN search_conducted = 1 THEN 1 END)
        + COUNT(CASE WHEN is_arrested = 1 THEN 1 END) DESC,
    violation
"#,
        columns: &["violation", "search_count", "arrest_count"],
    },
    QueryTemplate {
        id: "young_driver_violations",
        label: "Which violations are most common among younger drivers (<25)",
        sql: r#"
SELECT violation, COUNT(*) AS stop_count
FROM {table}
WHERE driver_age < 25
GROUP BY violation
ORDER BY stop_count DESC, violation
"#,
        columns: &["violation", "stop_count"],
    },
    QueryTemplate {
        id: "violation_action_rate",
        label: "Is there a violation that rarely results in search or arrest",
        sql: r#"
SELECT violation, COUNT(*) AS total_stops,
    AVG(CASE WHEN search_conducted = 1 OR is_arrested = 1 THEN 1 ELSE 0 END) AS action_rate
FROM {table}
GROUP BY violation
ORDER BY total_stops DESC, violation
"#,
        columns: &["violation", "total_stops", "action_rate"],
    },
    QueryTemplate {
        id: "drug_stops_by_country",
        label: "Which countries report the highest rate of drug-related stops",
        sql: r#"
SELECT country_name, COUNT(*) AS drug_related_stops
FROM {table}
WHERE drugs_related_stop = 1
GROUP BY country_name
ORDER BY drug_related_stops DESC, country_name
"#,
        columns: &["country_name", "drug_related_stops"],
    },
    QueryTemplate {
        id: "arrest_rate_by_country_violation",
        label: "What is the arrest rate by country and violation",
        sql: r#"
SELECT country_name, violation_raw,
    COUNT(CASE WHEN is_arrested = 1 THEN 1 END) * 100.0 / COUNT(*) AS arrest_rate
FROM {table}
GROUP BY country_name, violation_raw
ORDER BY arrest_rate DESC, country_name, violation_raw
"#,
        columns: &["country_name", "violation_raw", "arrest_rate"],
    },
    QueryTemplate {
        id: "search_stops_by_country",
        label: "Which country has the most stops with search conducted",
        sql: r#"
SELECT country_name, COUNT(*) AS search_stop_count
FROM {table}
WHERE search_conducted = 1
GROUP BY country_name
ORDER BY search_stop_count DESC, country_name
"#,
        columns: &["country_name", "search_stop_count"],
    },
];

pub(super) const COMPLEX: &[QueryTemplate] = &[
    QueryTemplate {
        id: "yearly_arrests_by_country",
        label: "Yearly Breakdown of Stops and Arrests by Country (Using Subquery and Window Functions)",
        sql: r#"
SELECT country_name, year, total_stops, arrests,
    SUM(arrests) OVER (PARTITION BY country_name ORDER BY year) AS running_arrests
FROM (
    SELECT country_name,
        CAST(strftime('%Y', stop_date) AS INTEGER) AS year,
        COUNT(*) AS total_stops,
        COUNT(CASE WHEN is_arrested = 1 THEN 1 END) AS arrests
    FROM {table}
    GROUP BY country_name, year
) t
ORDER BY country_name, year
"#,
        columns: &[
            "country_name",
            "year",
            "total_stops",
            "arrests",
            "running_arrests",
        ],
    },
    QueryTemplate {
        id: "violation_trends_by_age_race",
        label: "Driver Violation Trends Based on Age and Race (Join with Subquery)",
        sql: r#"
SELECT p.driver_age AS driver_age,
    p.driver_race AS driver_race,
    p.violation AS violation,
    COUNT(*) AS stop_count
FROM {table} p
JOIN (
    SELECT driver_age, driver_race
    FROM {table}
    GROUP BY driver_age, driver_race
) t
ON p.driver_age = t.driver_age
AND p.driver_race = t.driver_race
GROUP BY p.driver_age, p.driver_race, p.violation
ORDER BY stop_count DESC, p.driver_age, p.driver_race, p.violation
"#,
        columns: &["driver_age", "driver_race", "violation", "stop_count"],
    },
    QueryTemplate {
        id: "stops_by_time_period",
        label: "Time Period Analysis of Stops",
        sql: r#"
SELECT CAST(strftime('%Y', p.stop_date) AS INTEGER) AS year,
    CAST(strftime('%m', p.stop_date) AS INTEGER) AS month,
    CAST(CASE
        WHEN instr(p.stop_time, ':') > 0 THEN substr(p.stop_time, 1, instr(p.stop_time, ':') - 1)
        ELSE p.stop_time
    END AS INTEGER) AS hour,
    COUNT(*) AS stop_count
FROM {table} p
WHERE p.stop_date IS NOT NULL AND p.stop_time IS NOT NULL
GROUP BY year, month, hour
ORDER BY year, month, hour
"#,
        columns: &["year", "month", "hour", "stop_count"],
    },
    QueryTemplate {
        id: "violation_search_arrest_rank",
        label: "Violations with High Search and Arrest Rates",
        sql: r#"
SELECT violation, search_rate, arrest_rate,
    RANK() OVER (ORDER BY (search_rate + arrest_rate) DESC) AS rank_order
FROM (
    SELECT violation,
        COUNT(CASE WHEN search_conducted = 1 THEN 1 END) * 100.0 / COUNT(*) AS search_rate,
        COUNT(CASE WHEN is_arrested = 1 THEN 1 END) * 100.0 / COUNT(*) AS arrest_rate
    FROM {table}
    GROUP BY violation
) t
ORDER BY rank_order, violation
"#,
        columns: &["violation", "search_rate", "arrest_rate", "rank_order"],
    },
    QueryTemplate {
        id: "demographics_by_country",
        label: "Driver Demographics by Country",
        sql: r#"
SELECT country_name, driver_age, driver_gender, driver_race, COUNT(*) AS stop_count
FROM {table}
GROUP BY country_name, driver_age, driver_gender, driver_race
ORDER BY country_name, stop_count DESC, driver_age, driver_gender, driver_race
"#,
        columns: &[
            "country_name",
            "driver_age",
            "driver_gender",
            "driver_race",
            "stop_count",
        ],
    },
    QueryTemplate {
        id: "top_violation_arrest_rates",
        label: "Top 5 Violations with Highest Arrest Rates",
        sql: r#"
SELECT violation, COUNT(*) AS total,
    SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS arrests,
    SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) * 1.0 / COUNT(*) AS arrest_rate
FROM {table}
GROUP BY violation
ORDER BY arrest_rate DESC, violation
LIMIT 5
"#,
        columns: &["violation", "total", "arrests", "arrest_rate"],
    },
];
