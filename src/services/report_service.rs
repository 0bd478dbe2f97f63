// src/services/report_service.rs
//
// Relatório achatado de faturas: por linha, as comissões derivadas do
// snapshot (valor * taxa / 100, 2 casas) e o lucro líquido (valor menos
// a soma das três). Projeção pura sobre as linhas já escopadas.

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::InvoiceRepository;
use crate::models::auth::User;
use crate::models::commission::RateSnapshot;
use crate::models::invoice::InvoiceView;
use crate::models::rbac::PermissionLevel;
use crate::models::report::{InvoiceReport, InvoiceReportRow, ReportTotals};

#[derive(Clone)]
pub struct ReportService {
    invoice_repo: InvoiceRepository,
}

impl ReportService {
    pub fn new(invoice_repo: InvoiceRepository) -> Self {
        Self { invoice_repo }
    }

    pub async fn invoice_report(
        &self,
        actor: &User,
        level: &PermissionLevel,
    ) -> Result<InvoiceReport, AppError> {
        let scope: Option<Uuid> = level.owner_scoped().then_some(actor.id);
        let views = self.invoice_repo.list_views(scope).await?;
        Ok(Self::project(views))
    }

    pub fn project(views: Vec<InvoiceView>) -> InvoiceReport {
        let mut totals = ReportTotals::default();
        let rows: Vec<InvoiceReportRow> = views.into_iter().map(Self::project_row).collect();

        for row in &rows {
            totals.total_amount += row.amount;
            totals.total_client_commission += row.client_commission;
            totals.total_distributor_commission += row.distributor_commission;
            totals.total_company_commission += row.company_commission;
            totals.total_net_profit += row.net_profit;
            if row.admin_to_company_paid {
                totals.completed_count += 1;
            } else {
                totals.pending_count += 1;
            }
        }

        InvoiceReport { rows, totals }
    }

    fn project_row(view: InvoiceView) -> InvoiceReportRow {
        let inv = &view.invoice;
        let client_commission =
            RateSnapshot::commission_for(inv.client_commission_rate, inv.amount);
        let distributor_commission =
            RateSnapshot::commission_for(inv.distributor_commission_rate, inv.amount);
        let company_commission =
            RateSnapshot::commission_for(inv.company_commission_rate, inv.amount);
        let net_profit =
            inv.amount - client_commission - distributor_commission - company_commission;

        let p = &inv.payment_status;
        InvoiceReportRow {
            invoice_code: inv.invoice_code.clone(),
            invoice_date: inv.invoice_date,
            client_name: view.client_name.clone(),
            distributor_name: view.distributor_name.clone(),
            company_name: view.company_name.clone(),
            file_name: view.file_name.clone(),
            amount: inv.amount,
            client_commission_rate: inv.client_commission_rate,
            distributor_commission_rate: inv.distributor_commission_rate,
            company_commission_rate: inv.company_commission_rate,
            client_commission,
            distributor_commission,
            company_commission,
            net_profit,
            overall_status: inv.overall_payment_status(),
            client_to_distributor_paid: p.client_to_distributor.is_paid,
            client_to_distributor_paid_at: p.client_to_distributor.paid_at,
            distributor_to_admin_paid: p.distributor_to_admin.is_paid,
            distributor_to_admin_paid_at: p.distributor_to_admin.paid_at,
            admin_to_company_paid: p.admin_to_company.is_paid,
            admin_to_company_paid_at: p.admin_to_company.paid_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::invoice::PaymentStage;
    use crate::services::testing::make_invoice;

    fn view(amount: i64) -> InvoiceView {
        let mut invoice = make_invoice(
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4(),
        );
        invoice.amount = Decimal::new(amount, 0);
        InvoiceView {
            invoice,
            client_name: "Mohammed".into(),
            file_name: "contract.pdf".into(),
            company_name: "Al-Noor".into(),
            distributor_name: "ahmed".into(),
        }
    }

    #[test]
    fn commissions_and_net_profit_derive_from_the_snapshot() {
        // Taxas 3 / 2 / 1 sobre 1000: comissões 30, 20, 10, líquido 940.
        let report = ReportService::project(vec![view(1000)]);
        let row = &report.rows[0];
        assert_eq!(row.client_commission, Decimal::new(3000, 2));
        assert_eq!(row.distributor_commission, Decimal::new(2000, 2));
        assert_eq!(row.company_commission, Decimal::new(1000, 2));
        assert_eq!(row.net_profit, Decimal::new(94000, 2));
    }

    #[test]
    fn totals_sum_over_all_rows() {
        let mut completed = view(500);
        let actor = uuid::Uuid::new_v4();
        for stage in PaymentStage::ALL {
            completed.invoice.apply_mark(stage, actor, Utc::now());
        }

        let report = ReportService::project(vec![view(1000), completed]);
        assert_eq!(report.totals.total_amount, Decimal::new(1500, 0));
        assert_eq!(report.totals.completed_count, 1);
        assert_eq!(report.totals.pending_count, 1);
        assert_eq!(
            report.totals.total_net_profit,
            report.rows.iter().map(|r| r.net_profit).sum::<Decimal>()
        );
    }

    #[test]
    fn empty_report_has_zeroed_totals() {
        let report = ReportService::project(vec![]);
        assert!(report.rows.is_empty());
        assert_eq!(report.totals.total_amount, Decimal::ZERO);
        assert_eq!(report.totals.completed_count, 0);
    }
}
