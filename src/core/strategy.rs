use futures_util::future::try_join_all;

use crate::{
    core::{id::Id, period::InvoicingPeriod, source::BillingSource},
    prelude::*,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum FetchStrategy {
    /// One period at a time.
    Sequential,

    /// All the periods at once, each period still fetches its hourly data before its VAT.
    #[default]
    Concurrent,
}

impl FetchStrategy {
    /// Fetch the missing hourly data and VAT of the periods.
    ///
    /// A period that fails to fetch stays unavailable and does not affect the others.
    #[instrument(skip_all, fields(strategy = ?self, n_periods = periods.len()))]
    pub async fn prefetch<S: BillingSource + ?Sized>(
        self,
        source: &S,
        contract_id: Id,
        periods: &mut [InvoicingPeriod],
    ) -> Result {
        info!("fetching…");
        match self {
            Self::Sequential => {
                for period in periods {
                    period.fetch(source, contract_id).await?;
                }
            }
            Self::Concurrent => {
                try_join_all(periods.iter_mut().map(|period| period.fetch(source, contract_id)))
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use itertools::Itertools;

    use super::*;
    use crate::{
        core::{
            period::tests::{new_period, record},
            record::HourlyTable,
        },
        quantity::percentage::Percentage,
    };

    /// In-memory source which counts the requests in flight.
    #[derive(Default)]
    pub struct FakeSource {
        pub failing_periods: Mutex<HashSet<Id>>,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
        pub n_hourly_requests: AtomicUsize,
        pub n_vat_requests: AtomicUsize,
    }

    impl FakeSource {
        async fn enter(&self) {
            let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BillingSource for FakeSource {
        async fn get_invoicing_periods(&self) -> Result<Vec<InvoicingPeriod>> {
            Ok((1..=3).map(new_period).collect())
        }

        async fn get_hourly_records(&self, period_id: Id, contract_id: Id) -> Result<HourlyTable> {
            self.n_hourly_requests.fetch_add(1, Ordering::SeqCst);
            self.enter().await;
            ensure!(contract_id == Id(42));
            if self.failing_periods.lock().unwrap().contains(&period_id) {
                bail!("503 Service Unavailable");
            }
            #[expect(clippy::cast_precision_loss)]
            let spot_price = 100.0 * period_id.0 as f64;
            Ok(HourlyTable::try_new(vec![
                record(0, 0.001, spot_price, 20.0, 10.0),
                record(1, 0.003, spot_price, 20.0, 10.0),
            ])?)
        }

        async fn get_vat_percentage(&self, _on: NaiveDate) -> Result<Percentage> {
            self.n_vat_requests.fetch_add(1, Ordering::SeqCst);
            self.enter().await;
            Ok(Percentage(24.0))
        }
    }

    async fn prefetch(strategy: FetchStrategy, source: &FakeSource) -> Result<Vec<InvoicingPeriod>> {
        let mut periods = source.get_invoicing_periods().await?;
        strategy.prefetch(source, Id(42), &mut periods).await?;
        Ok(periods)
    }

    #[tokio::test]
    async fn test_sequential() -> Result {
        let source = FakeSource::default();
        let periods = prefetch(FetchStrategy::Sequential, &source).await?;
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
        let prices = periods.iter().map(|period| period.average_spot_price().unwrap().0).collect_vec();
        assert_eq!(prices, [10.0, 20.0, 30.0]);
        assert!(periods.iter().all(|period| period.vat_percentage() == Some(Percentage(24.0))));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent() -> Result {
        let source = FakeSource::default();
        let periods = prefetch(FetchStrategy::Concurrent, &source).await?;
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 3);
        let prices = periods.iter().map(|period| period.average_spot_price().unwrap().0).collect_vec();
        assert_eq!(prices, [10.0, 20.0, 30.0]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_is_local_and_retried() -> Result {
        let source = FakeSource::default();
        source.failing_periods.lock().unwrap().insert(Id(2));
        let mut periods = prefetch(FetchStrategy::Concurrent, &source).await?;
        assert!(periods[0].total_spot_cost().is_some());
        assert!(periods[1].total_spot_cost().is_none());
        assert!(periods[1].vat_percentage().is_some());
        assert!(periods[2].total_spot_cost().is_some());
        assert_eq!(source.n_hourly_requests.load(Ordering::SeqCst), 3);

        source.failing_periods.lock().unwrap().clear();
        FetchStrategy::Concurrent.prefetch(&source, Id(42), &mut periods).await?;
        assert!(periods[1].total_spot_cost().is_some());

        // Only the failed period is requested again:
        assert_eq!(source.n_hourly_requests.load(Ordering::SeqCst), 4);
        Ok(())
    }
}
