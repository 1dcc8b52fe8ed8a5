//! Aggregation templates (Postgres dialect).
//!
//! Tokens in braces are substituted before execution:
//! - `{family}`: table prefix of the record family
//! - `{external_released}` / `{internal_released}`: quoted status code lists
//! - the remaining tokens are filled in by the builder
//!
//! Named parameters use the `:name` form and are bound by the executor.
//! Casts are written as `CAST(.. AS ..)` so that `::` never appears in a template.

/// Token replaced by the record family's table prefix.
pub const FAMILY_TOKEN: &str = "{family}";

/// Per-declaration valuation: line-item price times the latest exchange rate
/// effective on or before the declaration date.
pub const DECLARATION_VALUE: &str = "
    SELECT h.head_guid,
           SUM(l.total_price * r.rmb_rate) AS total_value,
           SUM(l.qty) AS item_quantity
      FROM {family}_invt_head h
     INNER JOIN {family}_invt_list l ON l.head_guid = h.head_guid
      LEFT JOIN exchrate r ON r.curr_code = l.currency
       AND r.begin_date = (
           SELECT MAX(e.begin_date)
             FROM exchrate e
            WHERE e.curr_code = l.currency
              AND e.begin_date <= h.sys_date)
     WHERE {value_filter}
     GROUP BY h.head_guid";

/// Daily released volume with a rollup subtotal row.
pub const DAILY_VOLUME: &str = "
SELECT CASE WHEN GROUPING(CAST(t.sys_date AS DATE)) = 1 THEN 'subtotal'
            ELSE to_char(CAST(t.sys_date AS DATE), 'YYYY-MM-DD') END AS day,
       COUNT(1) AS declarations,
       SUM(v.total_value) AS total_value
  FROM {family}_invt_head t
 INNER JOIN ({declaration_value}) v ON v.head_guid = t.head_guid
 WHERE CAST(t.sys_date AS DATE) BETWEEN :beginDate AND :endDate
   AND t.app_status IN ({external_released})
 GROUP BY ROLLUP(CAST(t.sys_date AS DATE))
 ORDER BY CAST(t.sys_date AS DATE), declarations DESC";

/// Valuation filter for the daily report; mirrors the outer population.
pub const DAILY_VALUE_FILTER: &str = "CAST(h.sys_date AS DATE) BETWEEN :beginDate AND :endDate
       AND h.app_status IN ({external_released})";

/// Single-row release counts.
pub const RELEASE_RATE: &str = "
SELECT COUNT(1) AS total,
       SUM(CASE WHEN t.app_status IN ({external_released}) THEN 1 ELSE 0 END) AS external_released,
       SUM(CASE WHEN t.cus_status IN ({internal_released}) THEN 1 ELSE 0 END) AS internal_released
  FROM {family}_invt_head t
 WHERE t.sys_date >= :beginDate
   AND t.sys_date < :endDate";

/// Count per status code with the window total alongside.
pub const STATUS_DISTRIBUTION: &str = "
SELECT t.{status_column} AS status_code,
       COUNT(1) AS declarations,
       CAST(SUM(COUNT(1)) OVER () AS BIGINT) AS total
  FROM {family}_invt_head t
 WHERE t.sys_date >= :beginDate
   AND t.sys_date < :endDate
 GROUP BY t.{status_column}
 ORDER BY declarations DESC";

/// Today's test traffic per status code with a grand total row.
pub const INTRADAY_TEST_VOLUME: &str = "
SELECT CASE WHEN GROUPING(t.app_status) = 1 THEN 'total'
            ELSE COALESCE(t.app_status, '') END AS status_code,
       COUNT(1) AS declarations
  FROM {family}_invt_head t
 WHERE t.order_no LIKE :referencePattern
   AND t.sys_date >= :beginTime
   AND t.sys_date < :endTime
 GROUP BY ROLLUP(t.app_status)
 ORDER BY declarations DESC";

/// Declarations grouped by office, optional month, agent, platform and owner.
pub const GROUPED_EXPORT: &str = "
SELECT t.customs_code AS office,
       {month_select} AS month,
       t.agent_name AS agent,
       t.ebp_name AS platform,
       t.owner_name AS owner,
       COUNT(1) AS declarations,
       SUM(v.total_value) AS total_value,
       SUM(v.item_quantity) AS item_quantity
  FROM {family}_invt_head t
 INNER JOIN ({declaration_value}) v ON v.head_guid = t.head_guid
 WHERE t.sys_date >= :beginDate
   AND t.sys_date < :endDate
   AND {status_filter}{office_filter}
 GROUP BY {group_keys}
 ORDER BY {group_keys}";

/// Valuation filter for the export; the outer query applies status and office.
pub const EXPORT_VALUE_FILTER: &str = "h.sys_date >= :beginDate AND h.sys_date < :endDate";

/// Month key expression.
pub const MONTH_EXPR: &str = "to_char(t.sys_date, 'YYYY-MM')";

/// Month column when month grouping is off.
pub const NO_MONTH: &str = "CAST(NULL AS TEXT)";
