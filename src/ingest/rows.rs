use std::io::Read;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::decimal::{Money, Rate};
use crate::errors::{ApprovalError, Result};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// customer sheet row as exported from the spreadsheet
#[derive(Debug, Deserialize)]
struct RawCustomerRow {
    #[serde(rename = "Customer ID")]
    customer_id: String,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Phone Number")]
    phone_number: String,
    #[serde(rename = "Monthly Salary")]
    monthly_salary: String,
    #[serde(rename = "Approved Limit")]
    approved_limit: String,
}

/// loan sheet row as exported from the spreadsheet
#[derive(Debug, Deserialize)]
struct RawLoanRow {
    #[serde(rename = "Customer ID")]
    customer_id: String,
    #[serde(rename = "Loan ID", default)]
    loan_id: Option<String>,
    #[serde(rename = "Loan Amount")]
    loan_amount: String,
    #[serde(rename = "Tenure")]
    tenure: String,
    #[serde(rename = "Interest Rate")]
    interest_rate: String,
    #[serde(rename = "Monthly payment")]
    monthly_payment: String,
    #[serde(rename = "EMIs paid on Time", default)]
    emis_paid_on_time: Option<String>,
    #[serde(rename = "Date of Approval")]
    date_of_approval: String,
    #[serde(rename = "End Date")]
    end_date: String,
}

/// parsed customer row; `external_id` is the sheet's own identifier
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub external_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: u64,
    pub monthly_salary: Money,
    pub approved_limit: Money,
}

/// parsed loan row referring to a customer by external id
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRow {
    pub external_customer_id: i64,
    pub external_loan_id: Option<i64>,
    pub loan_amount: Money,
    pub tenure_months: u32,
    pub interest_rate: Rate,
    pub monthly_repayment: Money,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// read every customer row; a malformed row aborts the read
pub fn read_customer_rows<R: Read>(reader: R) -> Result<Vec<CustomerRow>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in rdr.deserialize::<RawCustomerRow>().enumerate() {
        let row = index + 1;
        let raw = record?;
        rows.push(CustomerRow {
            external_id: parse_number(&raw.customer_id, row, "Customer ID")?,
            first_name: raw.first_name,
            last_name: raw.last_name,
            age: parse_number(&raw.age, row, "Age")?,
            phone_number: parse_number(&raw.phone_number, row, "Phone Number")?,
            monthly_salary: parse_money(&raw.monthly_salary, row, "Monthly Salary")?,
            approved_limit: parse_money(&raw.approved_limit, row, "Approved Limit")?,
        });
    }

    Ok(rows)
}

/// read every loan row; a malformed row aborts the read
pub fn read_loan_rows<R: Read>(reader: R) -> Result<Vec<LoanRow>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in rdr.deserialize::<RawLoanRow>().enumerate() {
        let row = index + 1;
        let raw = record?;
        let emis_paid_on_time = match raw.emis_paid_on_time.as_deref() {
            None | Some("") => 0,
            Some(value) => parse_number(value, row, "EMIs paid on Time")?,
        };
        let external_loan_id = match raw.loan_id.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_number(value, row, "Loan ID")?),
        };
        let interest_rate = Rate::from_percentage(
            parse_money(&raw.interest_rate, row, "Interest Rate")?.as_decimal(),
        );

        rows.push(LoanRow {
            external_customer_id: parse_number(&raw.customer_id, row, "Customer ID")?,
            external_loan_id,
            loan_amount: parse_money(&raw.loan_amount, row, "Loan Amount")?,
            tenure_months: parse_number(&raw.tenure, row, "Tenure")?,
            interest_rate,
            monthly_repayment: parse_money(&raw.monthly_payment, row, "Monthly payment")?,
            emis_paid_on_time,
            start_date: parse_date(&raw.date_of_approval, row, "Date of Approval")?,
            end_date: parse_date(&raw.end_date, row, "End Date")?,
        });
    }

    Ok(rows)
}

fn row_error(row: usize, column: &str, value: &str) -> ApprovalError {
    ApprovalError::IngestRow {
        row,
        message: format!("invalid {column}: {value:?}"),
    }
}

/// integers, tolerating a trailing `.0` left by spreadsheet exports
fn parse_number<T: FromStr>(value: &str, row: usize, column: &str) -> Result<T> {
    let trimmed = value.strip_suffix(".0").unwrap_or(value);
    trimmed.parse().map_err(|_| row_error(row, column, value))
}

fn parse_money(value: &str, row: usize, column: &str) -> Result<Money> {
    Money::from_str_exact(value).map_err(|_| row_error(row, column, value))
}

fn parse_date(value: &str, row: usize, column: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| row_error(row, column, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_customer_rows() {
        let input = "Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,178000,6400000
2, Adna ,Cross,41,9842826536,65000.0,2000000
";
        let rows = read_customer_rows(Cursor::new(input)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].external_id, 1);
        assert_eq!(rows[0].phone_number, 9629317944);
        assert_eq!(rows[0].approved_limit, Money::from_major(6_400_000));
        assert_eq!(rows[1].first_name, "Adna");
        assert_eq!(rows[1].monthly_salary, Money::from_major(65_000));
    }

    #[test]
    fn test_read_loan_rows_with_blank_emis() {
        let input = "Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
25,7798,900000,138,16.93,20489,,2018-07-24,2029-12-24
30,7799,500000,12,8.5,43542.5,12,24/01/2020,24-01-2021
";
        let rows = read_loan_rows(Cursor::new(input)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].external_customer_id, 25);
        assert_eq!(rows[0].external_loan_id, Some(7798));
        assert_eq!(rows[0].emis_paid_on_time, 0);
        assert_eq!(rows[0].interest_rate.as_percentage(), rust_decimal_macros::dec!(16.93));
        assert_eq!(rows[0].start_date, NaiveDate::from_ymd_opt(2018, 7, 24).unwrap());

        assert_eq!(rows[1].emis_paid_on_time, 12);
        assert_eq!(rows[1].monthly_repayment, Money::from_str_exact("43542.5").unwrap());
        assert_eq!(rows[1].start_date, NaiveDate::from_ymd_opt(2020, 1, 24).unwrap());
        assert_eq!(rows[1].end_date, NaiveDate::from_ymd_opt(2021, 1, 24).unwrap());
    }

    #[test]
    fn test_datetime_export_dates() {
        assert_eq!(
            parse_date("2019-03-01 00:00:00", 1, "End Date").unwrap(),
            NaiveDate::from_ymd_opt(2019, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_malformed_row_reports_position() {
        let input = "Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,178000,6400000
2,Adna,Cross,forty,9842826536,65000,2000000
";
        let err = read_customer_rows(Cursor::new(input)).unwrap_err();
        match err {
            ApprovalError::IngestRow { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("Age"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let input = "Customer ID,First Name\n1,Aaron\n";
        assert!(matches!(read_customer_rows(Cursor::new(input)), Err(ApprovalError::Csv(_))));
    }
}
